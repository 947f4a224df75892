//! Canonical keys for graph vertices.
//!
//! Providers are keyed by symbol identity ([`xid`]), consumers by function
//! site ([`gid`]).

use crate::annotation::Annotation;
use crate::entry::Entry;

/// Symbol identity of a provided or injected type.
///
/// Pointer markers are stripped, unqualified names are prefixed with the
/// declaring package, and a single `*` is restored for pointer types. The
/// annotation's disambiguating id is appended.
#[must_use]
pub fn xid(package: &str, ty: &str, annotation: &Annotation) -> String {
    let pointer = ty.contains('*');
    let bare = ty.replace('*', "");
    let qualified = if bare.contains('.') {
        bare
    } else {
        format!("{package}.{bare}")
    };
    let ty = if pointer {
        format!("*{qualified}")
    } else {
        qualified
    };

    format!("{ty}_{}", annotation.id())
}

/// Vertex identity of a function site.
#[must_use]
pub fn gid(entry: &Entry) -> String {
    format!("{}_{}", entry.path, entry.func_name())
}
