use std::collections::HashMap;

use polyemit_core::lang::registry::LangItemInfo;
use polyemit_core::lang::{builtins, markers, types};

fn assert_spellings_unique<Id>(table: &'static [LangItemInfo<Id>], resolve: fn(&str) -> Option<Id>, what: &str)
where
    Id: Copy + PartialEq + std::fmt::Debug + 'static,
{
    let mut seen: HashMap<&'static str, Id> = HashMap::new();

    for info in table {
        assert_eq!(
            resolve(info.canonical),
            Some(info.id),
            "{} canonical spelling not resolvable: {}",
            what,
            info.canonical
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate {} spelling {:?}: {:?} and {:?}", what, info.canonical, prev, info.id);
        }

        for &alias in info.aliases {
            assert_eq!(resolve(alias), Some(info.id), "{} alias not resolvable: {}", what, alias);
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!("duplicate {} alias spelling {:?}: {:?} and {:?}", what, alias, prev, info.id);
            }
        }
    }
}

#[test]
fn primitive_type_spellings_unique_and_resolvable() {
    assert_spellings_unique(types::PRIMITIVE_TYPES, types::primitive_from_str, "primitive type");
}

#[test]
fn generic_type_spellings_unique_and_resolvable() {
    assert_spellings_unique(types::GENERIC_TYPES, types::generic_from_str, "generic type");
}

#[test]
fn builtin_spellings_unique_and_resolvable() {
    assert_spellings_unique(builtins::BUILTIN_FUNCTIONS, builtins::from_str, "builtin");
}

#[test]
fn marker_spellings_unique_and_resolvable() {
    assert_spellings_unique(markers::MARKERS, markers::from_str, "marker");
}

#[test]
fn primitive_and_generic_spellings_do_not_overlap() {
    for info in types::PRIMITIVE_TYPES {
        for spelling in std::iter::once(&info.canonical).chain(info.aliases.iter()) {
            assert_eq!(
                types::generic_from_str(spelling),
                None,
                "{} is both a primitive and a generic spelling",
                spelling
            );
        }
    }
}
