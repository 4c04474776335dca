//! Depth-first population driver
//!
//! The walk keeps an explicit stack of frames, one per identifier on the
//! current path. A frame first drains the members of the collection version
//! it just handled, then advances to its next version.

use crate::cache::DocumentCache;
use crate::content::{ContentId, ContentType};
use crate::populate::{Outcome, Populated};
use crate::resolver::{Resolver, Revision, Revisions};
use crate::storage::{Backend, Ident};
use crate::{PopulateError, Result};
use std::collections::{HashSet, VecDeque};

/// An identifier being populated and the members still to visit
struct Frame<C> {
    revisions: Revisions<C>,
    children: VecDeque<ContentId>,
}

/// Populates a backend from a resolver
pub struct Populator<B, C> {
    resolver: Resolver<C>,
    backend: B,
}

impl<B: Backend, C: DocumentCache> Populator<B, C> {
    pub fn new(resolver: Resolver<C>, backend: B) -> Self {
        Self { resolver, backend }
    }

    pub fn resolver(&self) -> &Resolver<C> {
        &self.resolver
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Populates `id` and everything it contains
    ///
    /// `emit` is called once per visited version in depth-first order: a
    /// collection version is reported before its members, and members are
    /// visited in document order before the collection's next version.
    ///
    /// # Errors
    ///
    /// The first failure stops the walk. Versions already committed stay
    /// committed.
    pub async fn populate<F>(&mut self, id: &ContentId, mut emit: F) -> Result<()>
    where
        F: FnMut(&Populated),
    {
        let mut stack = vec![self.open(id).await?];

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.children.pop_front() {
                if stack.iter().any(|f| f.revisions.id() == &child) {
                    let mut path: Vec<String> =
                        stack.iter().map(|f| f.revisions.id().to_string()).collect();
                    path.push(child.to_string());
                    return Err(PopulateError::Cycle { path });
                }
                let frame = self.open(&child).await?;
                stack.push(frame);
                continue;
            }

            let Some(revision) = frame.revisions.next().await else {
                stack.pop();
                continue;
            };

            let populated = self.store(frame.revisions.id(), revision?)?;
            emit(&populated);

            match populated.content_type {
                ContentType::Collection => {
                    frame.children = self.backend.child_content_ids(populated.ident)?.into();
                }
                ContentType::Module => {
                    self.attach_resources(&populated.content_id, populated.ident)
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Populates each identifier in turn and collects every event
    pub async fn populate_all(&mut self, ids: &[ContentId]) -> Result<Vec<Populated>> {
        let mut events = Vec::new();
        for id in ids {
            self.populate(id, |event| events.push(event.clone())).await?;
        }
        Ok(events)
    }

    async fn open(&self, id: &ContentId) -> Result<Frame<C>> {
        let revisions = self.resolver.resolve(id).await?;
        tracing::info!("Populating {} ({} version(s))", id, revisions.remaining());
        Ok(Frame {
            revisions,
            children: VecDeque::new(),
        })
    }

    /// Inserts a revision unless its (identifier, version) is already stored
    fn store(&mut self, id: &ContentId, revision: Revision) -> Result<Populated> {
        let metadata = &revision.unit.metadata;

        let (ident, content_type, outcome) =
            match self.backend.find_record(&metadata.moduleid, &metadata.version)? {
                Some(ident) => (ident, self.backend.record_type(ident)?, Outcome::Exists),
                None => {
                    let (ident, content_type) = self
                        .backend
                        .insert_content(&revision.unit, revision.document.as_bytes())?;
                    (ident, content_type, Outcome::Inserted)
                }
            };

        tracing::info!(
            "{} {} version {} (ident {})",
            match outcome {
                Outcome::Inserted => "Inserted",
                Outcome::Exists => "Exists",
            },
            id,
            metadata.version,
            ident
        );

        Ok(Populated {
            ident,
            content_id: id.clone(),
            version: metadata.version.clone(),
            content_type,
            outcome,
        })
    }

    /// Fetches and stores the module's resource files the record lacks
    async fn attach_resources(&mut self, id: &ContentId, ident: Ident) -> Result<()> {
        let version = self.backend.record_version(ident)?;
        let host = self.resolver.host();

        let names = host.resource_names(id, &version).await?;
        let recorded = self.backend.recorded_filenames(ident)?;
        let primary = ContentType::Module.primary_filename();

        let mut seen = HashSet::new();
        for name in names {
            if name == primary || recorded.contains(&name) || !seen.insert(name.clone()) {
                continue;
            }

            let resource = host.fetch_resource(id, &version, &name).await?;
            let file_id = self.backend.attach_file(
                ident,
                &resource.filename,
                &resource.mime_type,
                &resource.bytes,
            )?;
            tracing::info!(
                "Attached {} ({}, {} bytes) to {} version {} as file {}",
                resource.filename,
                resource.mime_type,
                resource.bytes.len(),
                id,
                version,
                file_id
            );
        }

        Ok(())
    }
}
