//! core::refs
//!
//! Structured identities parsed out of raw git reference names.
//!
//! # Types
//!
//! - [`NameRef`] - any reference: optional namespace kind plus a name
//! - [`PatchRef`] - a reference under `patchset/<name>[/<type><vers>]`
//!
//! # Lazy fields
//!
//! `object`, `base` and `count` are looked up on first access through a
//! [`RefBackend`] and cached for the lifetime of the instance. Lookups that
//! fail degrade to sentinels (empty string, or [`UNKNOWN_BASE`]) so a listing
//! of many refs never aborts because of one unresolvable entry.
//!
//! # Example
//!
//! ```
//! use patchset::core::refs::{PatchRef, RefKind};
//!
//! let r = PatchRef::parse("patchset/foo/v2.1").unwrap();
//! assert_eq!(r.kind(), Some(&RefKind::Heads));
//! assert_eq!(r.fullname(), "refs/heads/patchset/foo/v2.1");
//! assert_eq!(r.covertag(), "refs/tags/patchset/foo/v2.1/cover");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::backend::RefBackend;
use super::covertags::CoverTagCache;
use super::error::PatchsetError;
use super::lazy::Lazy;
use super::version::Version;

/// Base reported when no resolution strategy produced a commit.
pub const UNKNOWN_BASE: &str = "<unknown>";

/// Namespace prefix under which all patchset branches and tags live.
pub const PATCHSET_PREFIX: &str = "patchset/";

static SEPARATORS: OnceLock<Regex> = OnceLock::new();
static NAMEREF_RE: OnceLock<Regex> = OnceLock::new();
static PATCHREF_RE: OnceLock<Regex> = OnceLock::new();

fn separators() -> &'static Regex {
    SEPARATORS.get_or_init(|| Regex::new(r"/{2,}").expect("invalid separator regex"))
}

fn nameref_regex() -> &'static Regex {
    NAMEREF_RE.get_or_init(|| {
        Regex::new(r"^(?:(?:refs/)?(tags|heads|remotes/[^/]+)/)?(.*)$")
            .expect("invalid refname regex")
    })
}

fn patchref_regex() -> &'static Regex {
    PATCHREF_RE.get_or_init(|| {
        Regex::new(r"^patchset/([^/]+)(?:/([av])([0-9]+\.[0-9]+))?")
            .expect("invalid patchset regex")
    })
}

/// The namespace a reference lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// `refs/heads/`
    Heads,
    /// `refs/tags/`
    Tags,
    /// `refs/remotes/<remote>/`
    Remote(String),
}

impl RefKind {
    fn from_segment(segment: &str) -> Self {
        match segment {
            "heads" => RefKind::Heads,
            "tags" => RefKind::Tags,
            other => RefKind::Remote(
                other
                    .strip_prefix("remotes/")
                    .unwrap_or(other)
                    .to_string(),
            ),
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Heads => write!(f, "heads"),
            RefKind::Tags => write!(f, "tags"),
            RefKind::Remote(remote) => write!(f, "remotes/{}", remote),
        }
    }
}

/// A parsed reference name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    name: String,
    kind: Option<RefKind>,
    object: Lazy<String>,
}

impl NameRef {
    /// Parse a reference name.
    ///
    /// Repeated separators are collapsed. An optional
    /// `(refs/)?(tags|heads|remotes/<remote>)/` prefix selects the kind; the
    /// remainder is the name.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsetError::NameRef`] if nothing is left for the name.
    ///
    /// # Example
    ///
    /// ```
    /// use patchset::core::refs::{NameRef, RefKind};
    ///
    /// let r = NameRef::parse("refs//remotes/origin///main").unwrap();
    /// assert_eq!(r.kind(), Some(&RefKind::Remote("origin".into())));
    /// assert_eq!(r.name(), "main");
    /// assert_eq!(r.fullname(), "refs/remotes/origin/main");
    ///
    /// assert!(NameRef::parse("refs/heads/").is_err());
    /// ```
    pub fn parse(refname: &str) -> Result<Self, PatchsetError> {
        let collapsed = separators().replace_all(refname, "/");

        let caps = nameref_regex()
            .captures(&collapsed)
            .ok_or_else(|| PatchsetError::NameRef(refname.to_string()))?;

        let name = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if name.is_empty() {
            return Err(PatchsetError::NameRef(refname.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            kind: caps.get(1).map(|m| RefKind::from_segment(m.as_str())),
            object: Lazy::Unresolved,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<&RefKind> {
        self.kind.as_ref()
    }

    /// The full reference name, e.g. `refs/heads/main`.
    ///
    /// Without a kind this is just the name.
    pub fn fullname(&self) -> String {
        match &self.kind {
            Some(kind) => format!("refs/{}/{}", kind, self.name),
            None => self.name.clone(),
        }
    }

    /// Short object id, resolved once. Empty if the backend cannot resolve it.
    pub fn object(&mut self, backend: &dyn RefBackend) -> &str {
        let fullname = self.fullname();
        self.object
            .get_or_resolve(|| backend.short_id(&fullname).unwrap_or_default())
    }

    /// Record an object id that is already known (e.g. from a ref listing).
    pub fn set_object(&mut self, object: impl Into<String>) {
        self.object.set(object.into());
    }
}

impl fmt::Display for NameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

/// Describe `spec` by its nearest non-patchset ref.
///
/// # Errors
///
/// Returns [`PatchsetError::Other`] if the backend finds nothing.
pub fn describe(backend: &dyn RefBackend, spec: &str) -> Result<NameRef, PatchsetError> {
    let described = backend
        .describe(spec)
        .ok_or_else(|| PatchsetError::other(format!("Unable to describe object: {spec}")))?;
    NameRef::parse(&described)
}

/// Whether a patchset version is a working draft or archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatchType {
    /// `v<vers>`
    Draft,
    /// `a<vers>`
    Archived,
}

impl PatchType {
    pub fn as_char(self) -> char {
        match self {
            PatchType::Draft => 'v',
            PatchType::Archived => 'a',
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "v" => Some(PatchType::Draft),
            "a" => Some(PatchType::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A reference that identifies one version of one patchset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRef {
    nameref: NameRef,
    patch_name: String,
    patch_type: Option<PatchType>,
    patch_vers: String,
    /// Older versions of the same patchset keyed by `"<type><vers>"`.
    ///
    /// Only the latest version of a lineage carries entries; they never nest.
    pub prev_vers: BTreeMap<String, PatchRef>,
    base: Lazy<String>,
    count: Lazy<String>,
}

impl PatchRef {
    /// Parse a patchset reference.
    ///
    /// Without an explicit namespace the kind defaults to `Tags` for names
    /// ending in `/cover` and to `Heads` otherwise.
    ///
    /// # Errors
    ///
    /// - [`PatchsetError::NameRef`] if the input is not a reference at all
    /// - [`PatchsetError::BadPatchRef`] if it is not under `patchset/`
    pub fn parse(refname: &str) -> Result<Self, PatchsetError> {
        let mut nameref = NameRef::parse(refname)?;

        let caps = patchref_regex()
            .captures(&nameref.name)
            .ok_or_else(|| PatchsetError::BadPatchRef(refname.to_string()))?;

        let patch_name = caps[1].to_string();
        let patch_type = caps.get(2).and_then(|m| PatchType::from_segment(m.as_str()));
        let patch_vers = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        if nameref.kind.is_none() {
            nameref.kind = Some(if nameref.name.ends_with("/cover") {
                RefKind::Tags
            } else {
                RefKind::Heads
            });
        }

        Ok(Self {
            nameref,
            patch_name,
            patch_type,
            patch_vers,
            prev_vers: BTreeMap::new(),
            base: Lazy::Unresolved,
            count: Lazy::Unresolved,
        })
    }

    /// Build the branch ref for a given patchset version.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsetError::BadPatchRef`] if `name` is empty or contains
    /// a path separator.
    pub fn for_version(
        name: &str,
        patch_type: PatchType,
        version: Version,
    ) -> Result<Self, PatchsetError> {
        if name.is_empty() || name.contains('/') {
            return Err(PatchsetError::BadPatchRef(name.to_string()));
        }
        Self::parse(&format!(
            "refs/heads/{}{}/{}{}",
            PATCHSET_PREFIX, name, patch_type, version
        ))
    }

    pub fn name(&self) -> &str {
        self.nameref.name()
    }

    pub fn kind(&self) -> Option<&RefKind> {
        self.nameref.kind()
    }

    pub fn fullname(&self) -> String {
        self.nameref.fullname()
    }

    pub fn patch_name(&self) -> &str {
        &self.patch_name
    }

    pub fn patch_type(&self) -> Option<PatchType> {
        self.patch_type
    }

    /// The raw `MAJOR.MINOR` string, empty when the ref carries no version.
    pub fn patch_vers(&self) -> &str {
        &self.patch_vers
    }

    /// The parsed version, if the ref carries one.
    pub fn version(&self) -> Option<Version> {
        Version::parse(&self.patch_vers)
    }

    pub fn archived(&self) -> bool {
        self.patch_type == Some(PatchType::Archived)
    }

    /// Lineage key: `"<type><vers>"`, e.g. `v1.0`.
    pub fn version_key(&self) -> String {
        match self.patch_type {
            Some(t) => format!("{}{}", t, self.patch_vers),
            None => self.patch_vers.clone(),
        }
    }

    /// Display name: `patchset/<name>/<type><vers>`.
    pub fn short_name(&self) -> String {
        format!("{}{}/{}", PATCHSET_PREFIX, self.patch_name, self.version_key())
    }

    /// The branch name as git porcelain expects it (no `refs/heads/`).
    pub fn branch_name(&self) -> String {
        let fullname = self.fullname();
        match fullname.strip_prefix("refs/heads/") {
            Some(branch) => branch.to_string(),
            None => fullname,
        }
    }

    /// The cover tag that belongs to this ref.
    ///
    /// - a branch with name, type and version maps to
    ///   `refs/tags/patchset/<name>/<type><vers>/cover`
    /// - a tag is its own cover tag
    /// - anything else has none (empty string)
    pub fn covertag(&self) -> String {
        match self.kind() {
            Some(RefKind::Heads) => match self.patch_type {
                Some(t) if !self.patch_name.is_empty() && !self.patch_vers.is_empty() => {
                    format!(
                        "refs/tags/{}{}/{}{}/cover",
                        PATCHSET_PREFIX, self.patch_name, t, self.patch_vers
                    )
                }
                _ => String::new(),
            },
            Some(RefKind::Tags) => self.fullname(),
            _ => String::new(),
        }
    }

    pub fn object(&mut self, backend: &dyn RefBackend) -> &str {
        self.nameref.object(backend)
    }

    pub fn set_object(&mut self, object: impl Into<String>) {
        self.nameref.set_object(object);
    }

    /// The commit the series starts from.
    ///
    /// Tried in order:
    /// 1. the cover tag's target from `cache`
    /// 2. the peeled cover tag (`<covertag>^{}`)
    /// 3. the nearest non-patchset ref before the branch tip
    /// 4. [`UNKNOWN_BASE`]
    pub fn patch_base(
        &mut self,
        backend: &dyn RefBackend,
        cache: Option<&CoverTagCache>,
    ) -> &str {
        let covertag = self.covertag();
        let fullname = self.fullname();

        self.base
            .get_or_resolve(|| resolve_base(backend, cache, &covertag, &fullname))
    }

    /// Number of commits in `base..object`, empty if unavailable.
    pub fn count(&mut self, backend: &dyn RefBackend, cache: Option<&CoverTagCache>) -> &str {
        let base = self.patch_base(backend, cache).to_string();
        let object = self.object(backend).to_string();

        self.count.get_or_resolve(|| {
            if base == UNKNOWN_BASE || base.is_empty() || object.is_empty() {
                return String::new();
            }
            backend
                .count_commits(&base, &object)
                .map(|n| n.to_string())
                .unwrap_or_default()
        })
    }
}

impl fmt::Display for PatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

fn resolve_base(
    backend: &dyn RefBackend,
    cache: Option<&CoverTagCache>,
    covertag: &str,
    fullname: &str,
) -> String {
    if let Some(target) = cache.and_then(|c| c.target(covertag)) {
        log::debug!("base of {} from cover tag cache: {}", fullname, target);
        return target.to_string();
    }

    if !covertag.is_empty() {
        if let Some(id) = backend.short_id(&format!("{covertag}^{{}}")) {
            return id;
        }
    }

    match describe(backend, &format!("{fullname}~")) {
        Ok(mut described) => {
            let object = described.object(backend);
            if object.is_empty() {
                UNKNOWN_BASE.to_string()
            } else {
                object.to_string()
            }
        }
        Err(err) => {
            log::debug!("{}", err);
            UNKNOWN_BASE.to_string()
        }
    }
}
