use crate::generate::{
    flatten, BackendConfig, ChatCompletions, DialogueRequest, DialogueService, GenerateError,
};
use crate::prompt::{build_prompt, persona, PromptConfig};
use crate::render;
use crate::store::Store;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Upper bound on vocabulary items fed into one dialogue.
pub const SAMPLE_LIMIT: usize = 15;

pub enum ExampleOutcome {
    /// Generation was skipped because no credential is configured.
    Skipped,
    Generated { id: String, document: PathBuf },
}

/// Runs the dialogue pipeline against the configured backend. A missing
/// credential downgrades to a warning and [`ExampleOutcome::Skipped`]; every
/// other failure propagates.
pub fn generate_example(
    store: &Store,
    excluded_batch: i64,
    backend: BackendConfig,
    out_dir: &Path,
) -> Result<ExampleOutcome> {
    let service = match ChatCompletions::new(backend) {
        Ok(service) => service,
        Err(GenerateError::MissingApiKey { var }) => {
            warn!("{} not set, skipping example generation", var);
            return Ok(ExampleOutcome::Skipped);
        }
        Err(err) => return Err(err.into()),
    };
    run_pipeline(store, excluded_batch, &service, out_dir)
}

/// sample -> prompt -> service -> flatten -> persist -> render.
/// The service call is the only blocking step; a single attempt, no retries.
fn run_pipeline(
    store: &Store,
    excluded_batch: i64,
    service: &dyn DialogueService,
    out_dir: &Path,
) -> Result<ExampleOutcome> {
    let mut rng = rand::rng();
    let items = store.sample_vocabulary(excluded_batch, SAMPLE_LIMIT, &mut rng)?;
    info!("Sampled {} vocabulary items", items.len());

    let config = PromptConfig::default();
    let request = DialogueRequest {
        system: persona(&config),
        prompt: build_prompt(&items, &config),
    };
    let dialogue = service.generate(&request)?;

    let story = flatten(&dialogue);
    let id = store.insert_example(&story)?;
    let html = render::render_document(&story);
    let document = render::write_document(out_dir, &id, &html)?;
    info!("Created example {} in {:?}", id, document);
    Ok(ExampleOutcome::Generated { id, document })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, Dialogue, DialogueLine};
    use uuid::Uuid;

    struct FixedService(Dialogue);

    impl DialogueService for FixedService {
        fn generate(&self, _request: &DialogueRequest) -> Result<Dialogue, GenerateError> {
            Ok(self.0.clone())
        }
    }

    struct RejectingService;

    impl DialogueService for RejectingService {
        fn generate(&self, _request: &DialogueRequest) -> Result<Dialogue, GenerateError> {
            Err(GenerateError::SchemaViolation(
                "missing field `target`".to_string(),
            ))
        }
    }

    fn seeded_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        let cards = vec![Card {
            id: Uuid::new_v4().to_string(),
            batch_number: 2,
            front_text: "Guten Tag".to_string(),
            back_text: "Dzień dobry".to_string(),
            learned_timestamp: 0,
        }];
        store.replace_cards(&cards).unwrap();
        store
    }

    #[test]
    fn pipeline_persists_and_renders_generated_dialogue() {
        let store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        let service = FixedService(Dialogue {
            lines: vec![DialogueLine {
                speaker: "A".to_string(),
                source: "Guten Abend".to_string(),
                target: "Dobry wieczór".to_string(),
            }],
        });

        let outcome = run_pipeline(&store, 1, &service, dir.path()).unwrap();
        let ExampleOutcome::Generated { id, document } = outcome else {
            panic!("expected a generated example");
        };

        assert_eq!(store.count_examples().unwrap(), 1);
        assert!(document.starts_with(dir.path()));
        assert!(document.ends_with(format!(
            "{}.html",
            id.split('-').next().unwrap()
        )));
        let html = std::fs::read_to_string(document).unwrap();
        assert!(html.contains("data-original=\"Dobry wieczór\""));
    }

    #[test]
    fn schema_violation_leaves_store_untouched() {
        let store = seeded_store();
        let dir = tempfile::tempdir().unwrap();

        let result = run_pipeline(&store, 1, &RejectingService, dir.path());

        assert!(result.is_err());
        assert_eq!(store.count_examples().unwrap(), 0);
    }

    #[test]
    fn missing_credential_skips_without_example_rows() {
        let store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        let backend = BackendConfig {
            base_url: "https://example.invalid/v1",
            model: "test",
            api_key_var: "KARTEI_TEST_NO_CREDENTIAL",
        };

        let outcome = generate_example(&store, 1, backend, dir.path()).unwrap();

        assert!(matches!(outcome, ExampleOutcome::Skipped));
        assert_eq!(store.count_examples().unwrap(), 0);
        // The card table is unaffected by the skipped step.
        let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
        assert_eq!(sample.len(), 1);
    }
}
