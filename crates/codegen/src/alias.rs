/// Import alias for a package path: `m` followed by the hex MD5 digest.
///
/// The prefix keeps the alias a valid identifier when the digest starts
/// with a digit.
#[must_use]
pub fn alias_for(package_path: &str) -> String {
    format!("m{:x}", md5::compute(package_path.as_bytes()))
}
