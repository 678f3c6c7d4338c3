use ingest_core::{FieldNames, NormalizedDocument};

/// Render a document as front matter keyed by the configured field names,
/// followed by the HTML body in a section tagged with the text field name.
pub fn build_record(fields: &FieldNames, doc: &NormalizedDocument) -> String {
    let mut front = String::from("---\n");
    push_field(&mut front, &fields.title, &doc.title);
    push_field(&mut front, &fields.source, &doc.source_citation);
    if let Some(priority) = doc.priority.as_deref() {
        push_field(&mut front, &fields.priority, priority);
    }
    if !doc.tags.is_empty() {
        push_field(&mut front, "tags", &doc.tags.join(" "));
    }
    front.push_str("---\n\n");
    format!(
        "{front}<section data-field=\"{text}\">\n{body}\n</section>\n",
        text = fields.text,
        body = doc.body
    )
}

fn push_field(out: &mut String, key: &str, value: &str) {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&value);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_configured_field_names() {
        let fields = FieldNames {
            title: "Front".into(),
            text: "Back".into(),
            source: "Origin".into(),
            priority: "Prio".into(),
        };
        let doc = NormalizedDocument {
            title: "A\ntitle".into(),
            body: "<p>x</p>".into(),
            source_citation: "src".into(),
            priority: Some("High".into()),
            tags: vec!["Book".into()],
        };
        assert_eq!(
            build_record(&fields, &doc),
            "---\nFront: A title\nOrigin: src\nPrio: High\ntags: Book\n---\n\n\
             <section data-field=\"Back\">\n<p>x</p>\n</section>\n"
        );
    }
}
