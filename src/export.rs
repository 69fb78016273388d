//! Markdown export of a finished [`PublishArtifact`].
//!
//! Presentation glue over the terminal record: a deterministic rendering
//! with YAML front matter, the hero image, body sections with visuals
//! interleaved, infographics as tables, and the call to action. The
//! artifact itself stays the source of truth — this function never
//! mutates or enriches it.

use crate::records::{Infographic, PublishArtifact};

/// Render the artifact as a self-contained Markdown document.
pub fn render_markdown(artifact: &PublishArtifact) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format_front_matter(artifact));

    let content = &artifact.content;
    parts.push(format!("# {}\n", content.title));
    if !content.subtitle.is_empty() {
        parts.push(format!("*{}*\n", content.subtitle));
    }

    if !content.hero_image.url.is_empty() {
        parts.push(format!(
            "![{}]({})\n",
            content.hero_image.alt, content.hero_image.url
        ));
        if !content.hero_image.caption.is_empty() {
            parts.push(format!("*{}*\n", content.hero_image.caption));
        }
    }

    parts.push(format!("{}\n", content.introduction));

    // Interleave one visual after each section while any remain.
    let mut visuals = content.visuals.iter();
    for section in &content.sections {
        parts.push(format!("## {}\n", section.heading));
        parts.push(format!("{}\n", section.content));
        if let Some(visual) = visuals.next() {
            if !visual.url.is_empty() {
                parts.push(format!("![{}]({})\n", visual.description, visual.url));
            } else if !visual.suggestion.is_empty() {
                parts.push(format!("> Visual: {}\n", visual.suggestion));
            }
        }
    }

    for infographic in &content.infographics {
        parts.push(format_infographic(infographic));
    }

    if !content.call_to_action.is_empty() {
        parts.push(format!("---\n\n**{}**\n", content.call_to_action));
    }

    if !artifact.engagement.tags.is_empty() {
        let tags: Vec<String> = artifact
            .engagement
            .tags
            .iter()
            .map(|t| format!("`{t}`"))
            .collect();
        parts.push(format!("Tags: {}\n", tags.join(" ")));
    }

    let mut markdown = parts.join("\n");
    if !markdown.ends_with('\n') {
        markdown.push('\n');
    }
    markdown
}

fn format_front_matter(artifact: &PublishArtifact) -> String {
    let mut yaml = String::from("---\n");
    yaml.push_str(&format!("title: \"{}\"\n", escape(&artifact.seo.title)));
    yaml.push_str(&format!(
        "description: \"{}\"\n",
        escape(&artifact.seo.meta_description)
    ));
    yaml.push_str(&format!("slug: \"{}\"\n", escape(&artifact.seo.slug)));
    if !artifact.seo.keywords.is_empty() {
        yaml.push_str(&format!("keywords: [{}]\n", artifact.seo.keywords.join(", ")));
    }
    if !artifact.published_date.is_empty() {
        yaml.push_str(&format!("date: {}\n", artifact.published_date));
    }
    if !artifact.content.reading_time.is_empty() {
        yaml.push_str(&format!("reading_time: {}\n", artifact.content.reading_time));
    }
    yaml.push_str("---\n");
    yaml
}

fn format_infographic(infographic: &Infographic) -> String {
    let mut md = String::new();
    if !infographic.title.is_empty() {
        md.push_str(&format!("### {}\n\n", infographic.title));
    }
    md.push_str("| | |\n|---|---|\n");
    for element in &infographic.elements {
        md.push_str(&format!("| {} | {} |\n", element.label, element.value));
    }
    md
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}
