//! Namespace-aware reading of module and collection documents

use crate::content::{ContentType, ContentUnit, Metadata};
use crate::extract::{ExtractError, ExtractResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::collections::BTreeSet;

/// Metadata namespaces; older documents declare the versioned form.
const MDML_NAMESPACES: [&[u8]; 2] = [b"http://cnx.rice.edu/mdml", b"http://cnx.rice.edu/mdml/0.4"];

const COLLXML_NAMESPACES: [&[u8]; 1] = [b"http://cnx.rice.edu/collxml"];

/// A metadata element whose text is captured
#[derive(Debug)]
enum Field {
    ContentId,
    Version,
    Title,
    Created,
    Revised,
    Language,
    Abstract,
    Keyword,
    Subject,
    Role(String),
}

impl Field {
    fn from_element(start: &BytesStart) -> ExtractResult<Option<Self>> {
        let field = match start.local_name().as_ref() {
            b"content-id" => Self::ContentId,
            b"version" => Self::Version,
            b"title" => Self::Title,
            b"created" => Self::Created,
            b"revised" => Self::Revised,
            b"language" => Self::Language,
            b"abstract" => Self::Abstract,
            b"keyword" => Self::Keyword,
            b"subject" => Self::Subject,
            b"role" => match start.try_get_attribute("type")? {
                Some(kind) => Self::Role(kind.unescape_value()?.into_owned()),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(field))
    }
}

/// Text being accumulated for one field, opened at `depth`
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug, Default)]
struct Collected {
    content_id: Option<String>,
    version: Option<String>,
    title: Option<String>,
    created: Option<String>,
    revised: Option<String>,
    language: Option<String>,
    abstract_text: Option<String>,
    license_url: Option<String>,
    authors: Vec<String>,
    maintainers: Vec<String>,
    licensors: Vec<String>,
    keywords: BTreeSet<String>,
    subjects: BTreeSet<String>,
}

impl Collected {
    fn commit(&mut self, field: Field, text: &str) {
        let text = text.trim();
        match field {
            Field::ContentId => set_once(&mut self.content_id, text),
            Field::Version => set_once(&mut self.version, text),
            Field::Title => set_once(&mut self.title, text),
            Field::Created => set_once(&mut self.created, text),
            Field::Revised => set_once(&mut self.revised, text),
            Field::Language => set_once(&mut self.language, text),
            Field::Abstract => set_once(&mut self.abstract_text, text),
            Field::Keyword => {
                if !text.is_empty() {
                    self.keywords.insert(text.to_string());
                }
            }
            Field::Subject => {
                if !text.is_empty() {
                    self.subjects.insert(text.to_string());
                }
            }
            Field::Role(role) => {
                let people = text.split_whitespace().map(String::from);
                match role.as_str() {
                    "author" => self.authors.extend(people),
                    "maintainer" => self.maintainers.extend(people),
                    "licensor" => self.licensors.extend(people),
                    _ => {}
                }
            }
        }
    }

    fn read_license(&mut self, start: &BytesStart) -> ExtractResult<()> {
        if self.license_url.is_none() {
            if let Some(url) = start.try_get_attribute("url")? {
                let url = url.unescape_value()?;
                let url = url.trim();
                if !url.is_empty() {
                    self.license_url = Some(url.to_string());
                }
            }
        }
        Ok(())
    }

    fn into_unit(self, portal_type: ContentType) -> ExtractResult<ContentUnit> {
        let license_url = self.license_url.ok_or(ExtractError::MissingLicense)?;
        let metadata = Metadata {
            moduleid: required(self.content_id, "content-id")?,
            version: required(self.version, "version")?,
            name: required(self.title, "title")?,
            created: required(self.created, "created")?,
            revised: required(self.revised, "revised")?,
            language: required(self.language, "language")?,
            authors: self.authors,
            maintainers: self.maintainers,
            licensors: self.licensors,
            portal_type,
        };

        Ok(ContentUnit {
            abstract_text: self.abstract_text.unwrap_or_default(),
            license_url,
            metadata,
            keywords: self.keywords,
            subjects: self.subjects,
        })
    }
}

fn set_once(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = Some(text.to_string());
    }
}

fn required(value: Option<String>, name: &'static str) -> ExtractResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::MissingField(name))
}

fn in_namespace(ns: &ResolveResult, uris: &[&[u8]]) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => uris.iter().any(|candidate| candidate == uri),
        _ => false,
    }
}

fn check_root(start: &BytesStart, content_type: ContentType) -> ExtractResult<()> {
    let expected = match content_type {
        ContentType::Module => "document",
        ContentType::Collection => "collection",
    };
    let local = start.local_name();
    if local.as_ref() == expected.as_bytes() {
        Ok(())
    } else {
        Err(ExtractError::UnexpectedRoot {
            expected,
            found: String::from_utf8_lossy(local.as_ref()).into_owned(),
        })
    }
}

fn check_complete(root_seen: bool, depth: usize) -> ExtractResult<()> {
    if !root_seen {
        Err(ExtractError::Empty)
    } else if depth != 0 {
        Err(ExtractError::Truncated)
    } else {
        Ok(())
    }
}

/// Extracts abstract, license, core metadata, keywords and subjects
///
/// Only the document's `metadata` block is read, so titles and versions that
/// a collection records for its members do not leak into its own metadata.
///
/// # Arguments
///
/// * `document` - Raw `index.cnxml` or `collection.xml` text
/// * `content_type` - Which kind of document to expect
///
/// # Returns
///
/// * `Ok(ContentUnit)` - All required fields were present
/// * `Err(ExtractError)` - Malformed XML, wrong root, or missing fields
pub fn extract_metadata(document: &str, content_type: ContentType) -> ExtractResult<ContentUnit> {
    let mut reader = NsReader::from_str(document);
    let mut collected = Collected::default();
    let mut capture: Option<Capture> = None;
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut metadata_depth: Option<usize> = None;
    let mut metadata_done = false;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                if !root_seen {
                    check_root(&e, content_type)?;
                    root_seen = true;
                }
                depth += 1;

                if metadata_depth.is_none() {
                    if !metadata_done && e.local_name().as_ref() == b"metadata" {
                        metadata_depth = Some(depth);
                    }
                } else if capture.is_none() && in_namespace(&ns, &MDML_NAMESPACES) {
                    if e.local_name().as_ref() == b"license" {
                        collected.read_license(&e)?;
                    }
                    if let Some(field) = Field::from_element(&e)? {
                        capture = Some(Capture {
                            field,
                            depth,
                            text: String::new(),
                        });
                    }
                }
            }
            (ns, Event::Empty(e)) => {
                if !root_seen {
                    check_root(&e, content_type)?;
                    root_seen = true;
                }
                if metadata_depth.is_some()
                    && in_namespace(&ns, &MDML_NAMESPACES)
                    && e.local_name().as_ref() == b"license"
                {
                    collected.read_license(&e)?;
                }
            }
            (_, Event::Text(t)) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&t.unescape()?);
                }
            }
            (_, Event::CData(t)) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            (_, Event::End(_)) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let Some(done) = capture.take() {
                        collected.commit(done.field, &done.text);
                    }
                }
                if metadata_depth == Some(depth) {
                    metadata_depth = None;
                    metadata_done = true;
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    check_complete(root_seen, depth)?;
    collected.into_unit(content_type)
}

/// Lists the `document` identifiers of every member module, in document order
///
/// Members nested in subcollections are included where they appear.
pub fn extract_collection_members(document: &str) -> ExtractResult<Vec<String>> {
    let mut reader = NsReader::from_str(document);
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let (ns, start) = match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                depth += 1;
                (ns, e)
            }
            (ns, Event::Empty(e)) => (ns, e),
            (_, Event::End(_)) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            (_, Event::Eof) => break,
            _ => continue,
        };

        if !root_seen {
            check_root(&start, ContentType::Collection)?;
            root_seen = true;
        }

        if in_namespace(&ns, &COLLXML_NAMESPACES) && start.local_name().as_ref() == b"module" {
            if let Some(member) = start.try_get_attribute("document")? {
                let member = member.unescape_value()?;
                let member = member.trim();
                if !member.is_empty() {
                    members.push(member.to_string());
                }
            }
        }
    }

    check_complete(root_seen, depth)?;
    Ok(members)
}
