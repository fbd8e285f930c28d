//! Documents - one input tree plus everything extracted from it

use crate::error::EtkError;
use crate::knowledge_graph::KnowledgeGraph;
use crate::module::Issue;
use crate::resources::Resources;
use crate::segment::{value_text, Segment};
use etk_domain::{DocumentId, Extraction, Extractor, ExtractorInput, InputKind};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::{debug, warn};

/// What an extractor should run on
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A resolved segment of the document
    Segment(&'a Segment),
    /// Free text
    Text(&'a str),
    /// An arbitrary JSON value
    Value(&'a Value),
}

impl<'a> From<&'a Segment> for Target<'a> {
    fn from(segment: &'a Segment) -> Self {
        Target::Segment(segment)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(text: &'a str) -> Self {
        Target::Text(text)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(text: &'a String) -> Self {
        Target::Text(text)
    }
}

impl<'a> From<&'a Value> for Target<'a> {
    fn from(value: &'a Value) -> Self {
        Target::Value(value)
    }
}

impl<'a> Target<'a> {
    fn value(&self) -> Cow<'a, Value> {
        match *self {
            Target::Segment(segment) => Cow::Borrowed(segment.value()),
            Target::Value(value) => Cow::Borrowed(value),
            Target::Text(text) => Cow::Owned(Value::String(text.to_string())),
        }
    }

    fn text(&self) -> Option<Cow<'a, str>> {
        match *self {
            Target::Segment(segment) => value_text(segment.value()),
            Target::Value(value) => value_text(value),
            Target::Text(text) => Some(Cow::Borrowed(text)),
        }
    }
}

/// A raw input tree being processed
///
/// The raw tree is never modified. The first [`store`](Document::store)
/// materializes an overlay copy and every later path resolution in this
/// document reads from it.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    raw: Value,
    overlay: Option<Value>,
    mime_type: Option<String>,
    origin_url: String,
    kg: KnowledgeGraph,
    issues: Vec<Issue>,
    resources: Resources,
}

impl Document {
    /// Wrap `raw` in a document bound to `resources`
    ///
    /// Usually called through `Etk::create_document`.
    pub fn with_resources(
        resources: Resources,
        raw: Value,
        mime_type: Option<String>,
        origin_url: impl Into<String>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            raw,
            overlay: None,
            mime_type,
            origin_url: origin_url.into(),
            kg: KnowledgeGraph::new(),
            issues: Vec::new(),
            resources,
        }
    }

    /// Unique document ID
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The input tree, as given
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The tree path queries run against: the overlay once something was
    /// stored, the raw input before that
    pub fn tree(&self) -> &Value {
        self.overlay.as_ref().unwrap_or(&self.raw)
    }

    /// MIME type of the input, if known
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Where the input came from
    pub fn origin_url(&self) -> &str {
        &self.origin_url
    }

    /// Knowledge graph accumulated so far
    pub fn kg(&self) -> &KnowledgeGraph {
        &self.kg
    }

    /// Mutable access for modules that build values by hand
    pub fn kg_mut(&mut self) -> &mut KnowledgeGraph {
        &mut self.kg
    }

    /// Non-fatal issues reported while processing
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Report a non-fatal issue
    pub fn record_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Report several issues at once
    pub fn extend_issues(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// Shared resources this document was created with
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Resolve a path query against the current tree
    pub fn select_segments(&self, path: &str) -> Result<Vec<Segment>, EtkError> {
        Ok(self.resources.path_index().resolve(path, self.tree())?)
    }

    /// Run `extractor` on `target`
    ///
    /// The extractor receives text, tokens or the raw value depending on its
    /// [`InputKind`]. Arrays, objects and null have no text, so text and
    /// token extractors produce nothing for them. Under the `process` error
    /// policy an extractor failure is recorded as an issue and yields no
    /// extractions; under every other policy it is returned. Tokenizer
    /// failures are always returned.
    pub fn extract<'a>(
        &mut self,
        extractor: &dyn Extractor,
        target: impl Into<Target<'a>>,
    ) -> Result<Vec<Extraction>, EtkError> {
        let target = target.into();

        let result = match extractor.input_kind() {
            InputKind::Value => extractor.extract(ExtractorInput::Value(&target.value())),
            InputKind::Text => match target.text() {
                Some(text) => extractor.extract(ExtractorInput::Text(&text)),
                None => {
                    debug!("Target has no text, skipping extractor '{}'", extractor.name());
                    return Ok(Vec::new());
                }
            },
            InputKind::Tokens => match target.text() {
                Some(text) => {
                    let tokens = self.resources.tokenizer().tokenize(&text)?;
                    extractor.extract(ExtractorInput::Tokens(&tokens))
                }
                None => {
                    debug!("Target has no text, skipping extractor '{}'", extractor.name());
                    return Ok(Vec::new());
                }
            },
        };

        match result {
            Ok(extractions) => Ok(extractions),
            Err(e) if !e.is_fatal() && self.resources.error_policy().tolerates_extractor_errors() => {
                warn!("Extractor '{}' failed on document {}: {}", extractor.name(), self.id, e);
                self.issues.push(Issue::error(extractor.name(), e.to_string()));
                Ok(Vec::new())
            }
            Err(e) => Err(EtkError::Extraction {
                extractor: extractor.name().to_string(),
                source: e,
            }),
        }
    }

    /// Append a literal value to `field` of the knowledge graph
    pub fn add_value(&mut self, field: &str, value: impl Into<Value>) {
        self.kg.add_value(field, value);
    }

    /// Append every value `path` resolves to, in document order
    ///
    /// Returns how many values were added. A path that resolves to nothing
    /// leaves the knowledge graph unchanged.
    pub fn add_value_from_path(&mut self, field: &str, path: &str) -> Result<usize, EtkError> {
        let segments = self.select_segments(path)?;
        let count = segments.len();
        self.kg
            .extend(field, segments.into_iter().map(|s| s.value().clone()));
        Ok(count)
    }

    /// Attach `values` under `field` of the object at `segment`
    ///
    /// The values are written to the overlay (extending an existing array)
    /// and appended to `field` of the knowledge graph.
    pub fn store<I, V>(&mut self, segment: &Segment, field: &str, values: I) -> Result<(), EtkError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();

        let raw = &self.raw;
        let tree = self.overlay.get_or_insert_with(|| raw.clone());
        let target = segment.location().get_mut(tree).ok_or_else(|| {
            EtkError::Store(format!("No value at {} in document {}", segment.path(), self.id))
        })?;
        let object: &mut Map<String, Value> = target.as_object_mut().ok_or_else(|| {
            EtkError::Store(format!(
                "Cannot store '{}' at {}: not an object",
                field,
                segment.path()
            ))
        })?;

        match object.get_mut(field) {
            None => {
                object.insert(field.to_string(), Value::Array(values.clone()));
            }
            Some(Value::Array(existing)) => existing.extend(values.iter().cloned()),
            Some(_) => {
                return Err(EtkError::Store(format!(
                    "Cannot store '{}' at {}: field exists and is not an array",
                    field,
                    segment.path()
                )))
            }
        }

        debug!("Stored {} values under '{}' at {}", values.len(), field, segment.path());
        self.kg.extend(field, values);
        Ok(())
    }
}
