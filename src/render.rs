use crate::cloze;
use crate::reveal::REVEAL_SCRIPT;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const STYLE: &str = r#"    <style>
        .cloze {
            cursor: pointer;
            background-color: #f0f0f0;
            padding: 0 4px;
            border-radius: 3px;
        }

        html, body {
            font-size: 21px;
            max-width: 32rem;
            line-height: 1.5;
            margin-top: -25px;
            padding: 1rem;
            font-family: Arial, sans-serif;
        }

        br {
            margin-bottom: 16px;
        }

        .revealed {
            font-style: italic;
            background-color: hsl(56, 100%, 80%);
            padding: 5px
        }

        .hint {
            color: #999;
            font-size: 0.9em;
            margin-left: 0.5em;
        }
    </style>
"#;

/// Renders the flattened dialogue into a self-contained HTML document with
/// cloze spans and the reveal script.
pub fn render_document(story: &str) -> String {
    let with_breaks = cloze::break_speaker_lines(story);
    let body = cloze::rewrite_clozes(&with_breaks, cloze::cloze_span);
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         \x20   <title>Cloze Text Example</title>\n\
         {STYLE}\
         {REVEAL_SCRIPT}\
         </head>\n\
         <body>\n\
         \x20   <div>{body}</div>\n\
         </body>\n\
         </html>\n"
    )
}

/// Writes the document into `out_dir`, named from the first segment of the
/// example id. Returns the path of the written file.
pub fn write_document(out_dir: &Path, example_id: &str, html: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;
    let prefix = example_id.split('-').next().unwrap_or(example_id);
    let path = out_dir.join(format!("{}.html", prefix));
    fs::write(&path, html).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

#[test]
fn test_render_document_embeds_clozes_and_script() {
    let story = "A: Guten Tag [Dzień dobry]\nB: Bis bald [Do zobaczenia]";
    let html = render_document(story);

    assert!(html.contains("<br>A: Guten Tag"));
    assert!(html.contains("data-original=\"Dzień dobry\""));
    assert!(html.contains("revealNextCloze"));
    assert_eq!(html.matches("class=\"cloze\"").count(), 2);
    // The concealed answers never appear as visible text.
    assert!(!html.contains(">Dzień dobry<"));
}

#[test]
fn test_write_document_names_file_from_id_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");

    let path = write_document(
        &out_dir,
        "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
        "<!DOCTYPE html>",
    )
    .unwrap();

    assert_eq!(path, out_dir.join("1b4e28ba.html"));
    assert_eq!(fs::read_to_string(path).unwrap(), "<!DOCTYPE html>");
}
