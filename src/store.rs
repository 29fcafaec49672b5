//! Filesystem draft store
//!
//! One Markdown artifact per draft; the stage subdirectory the artifact sits
//! in is the single source of truth for the draft's state. This module owns
//! all artifact I/O: enumeration, latest-draft resolution, creation, loading
//! with frontmatter parsing, and the atomic stage move.
//!
//! The stage move works by claiming the source artifact with a rename into a
//! hidden working name inside the destination directory. That rename is the
//! linearization point: exactly one contender wins it, every other concurrent
//! mover sees the source vanish. The claimed file is then rewritten with its
//! appended history and settled under its real name, so a reader never
//! observes a half-moved or half-written artifact under a stage name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec;
use crate::config::LockSettings;
use crate::error::{RelayError, Result};
use crate::types::{Draft, DraftId, DraftMeta, Stage};

/// Store rooted at a relay directory (`prompts/` by default)
#[derive(Debug, Clone)]
pub struct DraftStore {
    root: PathBuf,
    lock: LockSettings,
}

impl DraftStore {
    /// Create a store over the given relay root
    pub fn new(root: impl Into<PathBuf>, lock: LockSettings) -> Self {
        Self {
            root: root.into(),
            lock,
        }
    }

    /// Relay root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding artifacts in the given stage
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// Artifact names in a stage, lexicographic ascending
    ///
    /// The sequence-key prefix is fixed width, so this order is chronological.
    /// An absent or empty stage directory yields an empty list. Entries that
    /// are not decodable draft artifacts are skipped with a warning.
    pub async fn list(&self, stage: Stage) -> Result<Vec<String>> {
        let dir = self.stage_dir(stage);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read stage directory {}: {}", dir.display(), e),
            ))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read directory entry: {}", e),
            ))
        })? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(codec::ARTIFACT_EXT) {
                continue;
            }

            let name = match path.file_name().and_then(|s| s.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            // Working files from in-flight moves are dot-prefixed
            if name.starts_with('.') {
                continue;
            }
            if codec::decode(&name).is_err() {
                warn!("Skipping undecodable artifact name: {}", name);
                continue;
            }

            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Id of the newest draft in a stage
    ///
    /// Fails with `NoDraftsFound` on an empty stage, and with
    /// `AmbiguousLatest` when more than one artifact shares the maximal
    /// sequence key; a collision is a configuration error, never tie-broken.
    pub async fn latest(&self, stage: Stage) -> Result<DraftId> {
        let names = self.list(stage).await?;
        let last = names
            .last()
            .ok_or_else(|| RelayError::NoDraftsFound(format!("stage '{}' is empty", stage)))?;

        if names.len() > 1 {
            let runner_up = &names[names.len() - 2];
            if codec::sequence_key_of(runner_up) == codec::sequence_key_of(last) {
                return Err(RelayError::AmbiguousLatest(format!(
                    "sequence key '{}' is shared by '{}' and '{}'",
                    codec::sequence_key_of(last),
                    runner_up,
                    last
                )));
            }
        }

        codec::decode(last)
    }

    /// Id of the newest sent draft addressed to the given agent
    ///
    /// The inbound resolution used when `ack` is invoked without an explicit
    /// id: sent artifacts are filtered by their recorded recipient before the
    /// newest one is picked, so agents never resolve each other's drafts.
    pub async fn latest_sent_to(&self, agent: &str) -> Result<DraftId> {
        let names = self.list(Stage::Sent).await?;

        let mut matched: Vec<String> = Vec::new();
        for name in names {
            let draft = self.load_by_name(&name, Stage::Sent).await?;
            if draft.to_agent() == Some(agent) {
                matched.push(name);
            }
        }

        let last = matched.last().ok_or_else(|| {
            RelayError::NoDraftsFound(format!("no sent drafts addressed to '{}'", agent))
        })?;

        if matched.len() > 1 {
            let runner_up = &matched[matched.len() - 2];
            if codec::sequence_key_of(runner_up) == codec::sequence_key_of(last) {
                return Err(RelayError::AmbiguousLatest(format!(
                    "sequence key '{}' is shared by '{}' and '{}'",
                    codec::sequence_key_of(last),
                    runner_up,
                    last
                )));
            }
        }

        codec::decode(last)
    }

    /// Write a new pending draft
    ///
    /// The artifact is created under `drafts/` with a fresh id and the
    /// current sequence key; the content is stored as-is, without
    /// frontmatter, matching what producing agents drop there themselves.
    pub async fn create(&self, slug: &str, content: &str) -> Result<Draft> {
        let id = DraftId::new();
        let name = codec::encode(&codec::sequence_key_now(), id, slug)?;

        let dir = self.stage_dir(Stage::Pending);
        fs::create_dir_all(&dir).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create stage directory {}: {}", dir.display(), e),
            ))
        })?;

        let path = dir.join(&name);
        fs::write(&path, content).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write draft {}: {}", path.display(), e),
            ))
        })?;

        debug!("Created pending draft {} as '{}'", id, name);
        Ok(Draft {
            name,
            id,
            stage: Stage::Pending,
            meta: DraftMeta::new(id),
            content: content.to_string(),
        })
    }

    /// Artifact name for an id within a stage, if present
    pub async fn find(&self, id: DraftId, stage: Stage) -> Result<Option<String>> {
        for name in self.list(stage).await? {
            if codec::decode(&name).ok() == Some(id) {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// Stage currently holding an id, scanning in lifecycle order
    pub async fn stage_of(&self, id: DraftId) -> Result<Option<Stage>> {
        for stage in Stage::ALL {
            if self.find(id, stage).await?.is_some() {
                return Ok(Some(stage));
            }
        }
        Ok(None)
    }

    /// Load a draft by id from the given stage
    pub async fn load(&self, id: DraftId, stage: Stage) -> Result<Draft> {
        let name = self
            .find(id, stage)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("{} in {}", id, stage)))?;
        self.load_by_name(&name, stage).await
    }

    async fn load_by_name(&self, name: &str, stage: Stage) -> Result<Draft> {
        let path = self.stage_dir(stage).join(name);
        let raw = fs::read_to_string(&path).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read draft {}: {}", path.display(), e),
            ))
        })?;

        let id = codec::decode(name)?;
        let (meta, content) = parse_artifact(&raw, id)?;
        if meta.id != id {
            return Err(RelayError::MalformedName(format!(
                "artifact '{}' declares id {} but its name encodes {}",
                name, meta.id, id
            )));
        }

        Ok(Draft {
            name: name.to_string(),
            id,
            stage,
            meta,
            content,
        })
    }

    /// Atomically relocate a draft into another stage
    ///
    /// The draft's metadata (with any newly appended history events) is
    /// rewritten into the artifact as part of the move. Fails with `NotFound`
    /// when the artifact is no longer in the draft's stage (including when a
    /// concurrent invocation moved it first), and with `AlreadyExists` when
    /// the destination stage already holds the id.
    pub async fn transfer(&self, draft: &Draft, to_stage: Stage) -> Result<()> {
        if self.lock.enabled {
            let lock_path = self.acquire_lock(draft.id).await?;
            let result = self.transfer_locked(draft, to_stage).await;
            self.release_lock(&lock_path).await;
            result
        } else {
            self.transfer_atomic(draft, to_stage).await
        }
    }

    async fn transfer_atomic(&self, draft: &Draft, to_stage: Stage) -> Result<()> {
        let source = self.stage_dir(draft.stage).join(&draft.name);
        let to_dir = self.stage_dir(to_stage);

        fs::create_dir_all(&to_dir).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create stage directory {}: {}",
                    to_dir.display(),
                    e
                ),
            ))
        })?;

        if let Some(existing) = self.find(draft.id, to_stage).await? {
            return Err(RelayError::AlreadyExists(format!(
                "{} already in {} as '{}'",
                draft.id, to_stage, existing
            )));
        }

        // Claim the artifact. This rename is the linearization point: when
        // two invocations race on the same draft, exactly one wins it and
        // the other finds the source gone.
        let nonce = Uuid::new_v4().simple().to_string();
        let claim = to_dir.join(format!(".{}.{}.claim", draft.name, nonce));
        match fs::rename(&source, &claim).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RelayError::NotFound(format!(
                    "{} no longer in {}",
                    draft.id, draft.stage
                )));
            }
            Err(e) => {
                return Err(RelayError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to claim draft {}: {}", source.display(), e),
                )));
            }
        }

        // Rewrite the claimed artifact with its updated frontmatter through
        // a sibling temp file, so the claimed copy is never truncated.
        let result = self
            .settle_claim(draft, to_stage, &to_dir, &claim, &nonce)
            .await;
        if result.is_err() {
            // Put the artifact back where a reader expects it
            if let Err(e) = fs::rename(&claim, &source).await {
                warn!(
                    "Failed to restore claimed draft {} to {}: {}",
                    draft.id,
                    source.display(),
                    e
                );
            }
        }
        result
    }

    async fn settle_claim(
        &self,
        draft: &Draft,
        to_stage: Stage,
        to_dir: &Path,
        claim: &Path,
        nonce: &str,
    ) -> Result<()> {
        let rendered = render_artifact(&draft.meta, &draft.content)?;
        let staged = to_dir.join(format!(".{}.{}.new", draft.name, nonce));
        fs::write(&staged, &rendered).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to stage draft rewrite {}: {}", staged.display(), e),
            ))
        })?;
        fs::rename(&staged, claim).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rewrite claimed draft {}: {}", claim.display(), e),
            ))
        })?;

        // The claim made this name exclusive, so settling cannot clobber a
        // concurrently created artifact.
        let dest = to_dir.join(&draft.name);
        fs::rename(claim, &dest).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to settle draft at {}: {}", dest.display(), e),
            ))
        })?;

        debug!(
            "Moved draft {} from {} to {}",
            draft.id, draft.stage, to_stage
        );
        Ok(())
    }

    /// Stage move for storage without atomic rename, serialized by the lock
    ///
    /// Writes the destination artifact with create-new semantics and then
    /// removes the source, which is safe because every mover holds the
    /// per-id lock while doing it.
    async fn transfer_locked(&self, draft: &Draft, to_stage: Stage) -> Result<()> {
        let source = self.stage_dir(draft.stage).join(&draft.name);
        let to_dir = self.stage_dir(to_stage);

        fs::create_dir_all(&to_dir).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create stage directory {}: {}",
                    to_dir.display(),
                    e
                ),
            ))
        })?;

        if !source.exists() {
            return Err(RelayError::NotFound(format!(
                "{} no longer in {}",
                draft.id, draft.stage
            )));
        }
        if let Some(existing) = self.find(draft.id, to_stage).await? {
            return Err(RelayError::AlreadyExists(format!(
                "{} already in {} as '{}'",
                draft.id, to_stage, existing
            )));
        }

        let rendered = render_artifact(&draft.meta, &draft.content)?;
        let dest = to_dir.join(&draft.name);
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = match options.open(&dest).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(RelayError::AlreadyExists(format!(
                    "{} already in {} as '{}'",
                    draft.id, to_stage, draft.name
                )));
            }
            Err(e) => {
                return Err(RelayError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write draft {}: {}", dest.display(), e),
                )));
            }
        };
        file.write_all(rendered.as_bytes()).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write draft {}: {}", dest.display(), e),
            ))
        })?;
        file.flush().await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to flush draft {}: {}", dest.display(), e),
            ))
        })?;
        drop(file);

        if let Err(e) = fs::remove_file(&source).await {
            warn!(
                "Failed to remove source draft {}: {}",
                source.display(),
                e
            );
        }

        debug!(
            "Moved draft {} from {} to {} under lock",
            draft.id, draft.stage, to_stage
        );
        Ok(())
    }

    /// Take the per-id advisory lock, polling until the configured deadline
    async fn acquire_lock(&self, id: DraftId) -> Result<PathBuf> {
        let lock_dir = self.root.join(".locks");
        fs::create_dir_all(&lock_dir).await.map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create lock directory {}: {}",
                    lock_dir.display(),
                    e
                ),
            ))
        })?;

        let lock_path = lock_dir.join(format!("{}.lock", id));
        let wait = Duration::from_millis(self.lock.timeout_ms);
        let poll = Duration::from_millis(self.lock.poll_ms.max(1));

        let acquired = timeout(wait, async {
            loop {
                let mut options = fs::OpenOptions::new();
                options.write(true).create_new(true);
                match options.open(&lock_path).await {
                    Ok(_) => return Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                        tokio::time::sleep(poll).await;
                    }
                    Err(e) => {
                        return Err(RelayError::Io(std::io::Error::new(
                            e.kind(),
                            format!("Failed to create lock file {}: {}", lock_path.display(), e),
                        )));
                    }
                }
            }
        })
        .await;

        match acquired {
            Ok(Ok(())) => Ok(lock_path),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RelayError::LockTimeout(format!(
                "draft {} still locked after {}ms",
                id, self.lock.timeout_ms
            ))),
        }
    }

    async fn release_lock(&self, lock_path: &Path) {
        if let Err(e) = fs::remove_file(lock_path).await {
            warn!("Failed to remove lock file {}: {}", lock_path.display(), e);
        }
    }
}

/// Parse an artifact into typed frontmatter and its opaque body
///
/// Artifacts dropped by producing agents may be plain prompt text; those get
/// fresh metadata carrying the filename-derived id. Frontmatter, when
/// present, is the YAML between `---` delimiters at the top of the file.
pub fn parse_artifact(raw: &str, fallback_id: DraftId) -> Result<(DraftMeta, String)> {
    let lines: Vec<&str> = raw.lines().collect();

    if !lines.first().map_or(false, |line| line.trim() == "---") {
        return Ok((DraftMeta::new(fallback_id), raw.to_string()));
    }

    let closing_index = match lines[1..].iter().position(|line| line.trim() == "---") {
        Some(pos) => pos + 1,
        // A lone opening delimiter is content, not metadata
        None => return Ok((DraftMeta::new(fallback_id), raw.to_string())),
    };

    let meta_str = lines[1..closing_index].join("\n");
    let meta: DraftMeta = serde_yaml::from_str(&meta_str)
        .map_err(|e| RelayError::Serialization(format!("Failed to parse frontmatter: {}", e)))?;

    // Skip the single blank separator line after the closing delimiter
    let mut content_start = closing_index + 1;
    if lines.get(content_start).map_or(false, |line| line.is_empty()) {
        content_start += 1;
    }
    let content = if content_start < lines.len() {
        lines[content_start..].join("\n")
    } else {
        String::new()
    };

    Ok((meta, content))
}

/// Render typed frontmatter and the opaque body back into artifact form
pub fn render_artifact(meta: &DraftMeta, content: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(meta)
        .map_err(|e| RelayError::Serialization(format!("Failed to serialize frontmatter: {}", e)))?;

    Ok(format!("---\n{}---\n\n{}", yaml, content))
}
