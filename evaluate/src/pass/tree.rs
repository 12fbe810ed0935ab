//! Path predicates over a flattened tree listing. Name checks are case-insensitive.

use model::github::TreeEntry;

pub(crate) fn blobs(tree: &[TreeEntry]) -> impl Iterator<Item = &TreeEntry> {
    tree.iter().filter(|entry| entry.is_blob())
}

pub(crate) fn blob_count(tree: &[TreeEntry]) -> usize {
    blobs(tree).count()
}

/// `dir` exists at the repository root, either listed itself or implied by a child path.
pub(crate) fn has_top_level_dir(tree: &[TreeEntry], dir: &str) -> bool {
    tree.iter().any(|entry| {
        let first = entry.path.split('/').next().unwrap_or_default();
        first.eq_ignore_ascii_case(dir) && (entry.is_tree() || entry.path.contains('/'))
    })
}

/// A root level file whose lowercase name satisfies `pred`.
pub(crate) fn has_root_file(tree: &[TreeEntry], pred: impl Fn(&str) -> bool) -> bool {
    blobs(tree)
        .filter(|entry| !entry.path.contains('/'))
        .any(|entry| pred(&entry.path.to_ascii_lowercase()))
}

/// A file anywhere in the tree whose lowercase name satisfies `pred`.
pub(crate) fn has_file(tree: &[TreeEntry], pred: impl Fn(&str) -> bool) -> bool {
    blobs(tree).any(|entry| pred(&entry.file_name().to_ascii_lowercase()))
}

/// Any directory segment, at any depth, named one of `names`.
pub(crate) fn has_dir_segment(tree: &[TreeEntry], names: &[&str]) -> bool {
    tree.iter().any(|entry| {
        let segments: Vec<&str> = entry.path.split('/').collect();
        let dirs = if entry.is_blob() {
            &segments[..segments.len() - 1]
        } else {
            &segments[..]
        };
        dirs.iter()
            .any(|segment| names.iter().any(|name| segment.eq_ignore_ascii_case(name)))
    })
}

pub(crate) fn any_path_contains(tree: &[TreeEntry], needle: &str) -> bool {
    tree.iter()
        .any(|entry| entry.path.to_ascii_lowercase().contains(needle))
}

pub(crate) fn is_markdown(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".mdx")
}

/// A markdown file anywhere whose lowercase name contains one of `needles`.
pub(crate) fn has_markdown_named(tree: &[TreeEntry], needles: &[&str]) -> bool {
    has_file(tree, |name| {
        is_markdown(name) && needles.iter().any(|needle| name.contains(needle))
    })
}
