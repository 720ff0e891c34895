use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::record::{AnnotationRecord, SpanRecord, TokenRecord, scalar_text};

/// Pretty-printing XML writer for the `<annotations>` document.
pub(crate) struct AnnotationXmlWriter {
    writer: Writer<Vec<u8>>,
}

impl AnnotationXmlWriter {
    pub(crate) fn begin() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .context("failed to write XML declaration")?;
        writer
            .write_event(Event::Start(BytesStart::new("annotations")))
            .context("failed to open <annotations>")?;
        Ok(Self { writer })
    }

    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        self.writer
            .write_event(Event::End(BytesEnd::new("annotations")))
            .context("failed to close <annotations>")?;
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub(crate) fn write_record(&mut self, record: &AnnotationRecord) -> Result<()> {
        self.open("annotation")?;

        self.text_element("text", &[], record.text.as_deref().unwrap_or_default())?;
        self.text_element("answer", &[], record.answer.as_deref().unwrap_or_default())?;

        if let Some(tokens) = &record.tokens {
            self.write_tokens(tokens)?;
        }

        if let Some(spans) = record.spans.as_ref().filter(|spans| !spans.is_empty()) {
            self.write_spans(spans)?;
        }

        self.open("metadata")?;
        self.text_element("input_hash", &[], &scalar_text(record.input_hash.as_ref()))?;
        self.text_element("task_hash", &[], &scalar_text(record.task_hash.as_ref()))?;
        self.text_element("timestamp", &[], &scalar_text(record.timestamp.as_ref()))?;
        self.text_element("view_id", &[], &scalar_text(record.view_id.as_ref()))?;
        self.close("metadata")?;

        self.close("annotation")
    }

    fn write_tokens(&mut self, tokens: &[TokenRecord]) -> Result<()> {
        if tokens.is_empty() {
            return self.empty_element("tokens", &[]);
        }

        self.open("tokens")?;
        for token in tokens {
            let attributes = [
                ("id", scalar_text(token.id.as_ref())),
                ("start", scalar_text(token.start.as_ref())),
                ("end", scalar_text(token.end.as_ref())),
            ];
            self.text_element("token", &attributes, token.text.as_deref().unwrap_or_default())?;
        }
        self.close("tokens")
    }

    fn write_spans(&mut self, spans: &[SpanRecord]) -> Result<()> {
        self.open("spans")?;
        for span in spans {
            let mut attributes = vec![
                ("start", scalar_text(span.start.as_ref())),
                ("end", scalar_text(span.end.as_ref())),
                ("label", span.label.clone().unwrap_or_default()),
            ];
            if let (Some(token_start), Some(token_end)) = (&span.token_start, &span.token_end) {
                attributes.push(("token_start", scalar_text(Some(token_start))));
                attributes.push(("token_end", scalar_text(Some(token_end))));
            }
            self.text_element("span", &attributes, span.text.as_deref().unwrap_or_default())?;
        }
        self.close("spans")
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .with_context(|| format!("failed to open <{name}>"))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .with_context(|| format!("failed to close <{name}>"))?;
        Ok(())
    }

    fn empty_element(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<()> {
        self.writer
            .write_event(Event::Empty(start_tag(name, attributes)))
            .with_context(|| format!("failed to write <{name}/>"))?;
        Ok(())
    }

    /// Empty text is written as a self-closing element.
    fn text_element(&mut self, name: &str, attributes: &[(&str, String)], text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty_element(name, attributes);
        }

        self.writer
            .write_event(Event::Start(start_tag(name, attributes)))
            .with_context(|| format!("failed to open <{name}>"))?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .with_context(|| format!("failed to write <{name}> text"))?;
        self.close(name)
    }
}

fn start_tag<'a>(name: &'a str, attributes: &'a [(&'a str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute((*key, value.as_str()));
    }
    start
}
