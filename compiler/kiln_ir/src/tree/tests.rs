use super::*;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

#[test]
fn test_tag_lookup_by_str() {
    let mut map: FxHashMap<Tag, u32> = FxHashMap::default();
    map.insert(Tag::new(String::from("call")), 1);
    map.insert(Tag::from("lvar"), 2);

    assert_eq!(map.get("call"), Some(&1));
    assert_eq!(map.get("lvar"), Some(&2));
    assert_eq!(map.get("lasgn"), None);
}

#[test]
fn test_static_and_owned_tags_are_equal() {
    assert_eq!(Tag::from("script"), Tag::from(String::from("script")));
}

#[test]
fn test_tree_accessors() {
    let tree = Tree::new("lasgn")
        .at_line(3)
        .push_symbol("x")
        .push(Tree::new("lit").push(Atom::Int(1)));

    assert!(tree.is("lasgn"));
    assert_eq!(tree.line, Some(3));
    assert_eq!(tree.symbol_at(0), Some("x"));
    assert_eq!(tree.tree_at(1).map(|t| t.tag.as_str()), Some("lit"));
    assert_eq!(tree.tree_at(0), None);
    assert_eq!(tree.symbol_at(5), None);
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn test_float_atoms_compare_by_bits() {
    assert_eq!(Atom::float(1.5), Atom::float(1.5));
    assert_ne!(Atom::float(0.0), Atom::float(-0.0));
}

#[test]
fn test_tree_display() {
    let tree = Tree::new("call")
        .push(Tree::new("nil"))
        .push_symbol("puts")
        .push(Atom::string("hi"));
    assert_eq!(tree.to_string(), "[:call, [:nil], :puts, \"hi\"]");
}
