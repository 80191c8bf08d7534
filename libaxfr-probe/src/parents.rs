/// Returns `domain` and its ancestors, starting at the registrable domain and
/// ending with `domain` itself.
///
/// `a.b.example.co.uk` gives `example.co.uk`, `b.example.co.uk`,
/// `a.b.example.co.uk`. Anything the public suffix list cannot split (a bare
/// suffix, an empty string) comes back unchanged as the only entry.
pub fn expand_parents(domain: &str) -> Vec<String> {
    let name = domain.strip_suffix('.').unwrap_or(domain);
    let lower = name.to_ascii_lowercase();

    let root_len = match psl::domain_str(&lower) {
        Some(root) => root.len(),
        None => return vec![domain.to_string()],
    };

    // psl hands back a suffix of `lower`, so the same byte range of `name`
    // is the registrable domain.
    let split = name.len() - root_len;
    let root = &name[split..];
    let subdomain = name[..split].trim_end_matches('.');

    let mut parents = vec![root.to_string()];
    if subdomain.is_empty() {
        return parents;
    }

    let mut parent = root.to_string();
    for label in subdomain.rsplit('.') {
        parent = format!("{}.{}", label, parent);
        parents.push(parent.clone());
    }

    parents
}
