//! External dependency policy.
//!
//! Classification happens in two stages:
//!
//! 1. A structural check: relative (`./`, `../`), root-absolute, filesystem
//!    absolute and bundler-internal (`\0…`, `rolldown:…`) specifiers refer to
//!    workspace-local code and are always inlined.
//! 2. For targets that externalize packages, every remaining specifier is
//!    left to the runtime. The allow-list is consulted first so that compound
//!    specifiers such as `react-dom/server` are reported as explicitly
//!    allowed rather than inferred.
//!
//! Classification is a pure function of the specifier and the policy, so two
//! builds of the same tree always agree on what was externalized.

use std::collections::BTreeSet;
use std::path::Path;

/// Where a specifier ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleDisposition {
    /// Bundled into the artifact
    Inline,
    /// Left as a runtime `require`/`import`
    External(ExternalReason),
}

impl ModuleDisposition {
    pub fn is_external(self) -> bool {
        matches!(self, Self::External(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalReason {
    /// Listed verbatim in the allow-list
    AllowListed,
    /// `node:`-prefixed platform module
    Builtin,
    /// Any other package specifier, including sub-paths (`pkg/sub`, `@scope/pkg/sub`)
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalPolicy {
    /// Inline everything (browser target)
    BundleAll,
    /// Keep package specifiers external (server target)
    ExternalizePackages { allow_list: BTreeSet<String> },
}

impl ExternalPolicy {
    pub fn externalize_packages<I, S>(allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ExternalizePackages {
            allow_list: allow_list.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow_list(&self) -> impl Iterator<Item = &str> {
        let list = match self {
            Self::BundleAll => None,
            Self::ExternalizePackages { allow_list } => Some(allow_list),
        };
        list.into_iter().flatten().map(String::as_str)
    }

    pub fn classify(&self, specifier: &str) -> ModuleDisposition {
        if is_local_specifier(specifier) {
            return ModuleDisposition::Inline;
        }

        match self {
            Self::BundleAll => ModuleDisposition::Inline,
            Self::ExternalizePackages { allow_list } => {
                if allow_list.contains(specifier) {
                    ModuleDisposition::External(ExternalReason::AllowListed)
                } else if specifier.starts_with("node:") {
                    ModuleDisposition::External(ExternalReason::Builtin)
                } else {
                    ModuleDisposition::External(ExternalReason::Package)
                }
            }
        }
    }
}

/// Structural check: does this specifier name workspace-local code?
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.is_empty()
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier.starts_with('\0')
        || specifier.starts_with("rolldown:")
        || Path::new(specifier).is_absolute()
}

/// Package name of a bare specifier: `react-dom/server` → `react-dom`,
/// `@scope/pkg/sub` → `@scope/pkg`.
pub fn package_name(specifier: &str) -> Option<&str> {
    if is_local_specifier(specifier) {
        return None;
    }
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);

    let end = if specifier.starts_with('@') {
        let mut slashes = specifier.match_indices('/').map(|(i, _)| i);
        slashes.next()?;
        slashes.next().unwrap_or(specifier.len())
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    Some(&specifier[..end])
}
