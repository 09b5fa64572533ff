use eagle_eye::core::cycle::CycleCursor;
use eagle_eye::core::urls::{InsertPosition, UrlList};
use proptest::prelude::*;

fn list_of(len: usize) -> UrlList {
    let mut urls = UrlList::new();
    for i in 0..len {
        urls.insert(&format!("http://host{i}.example/"), InsertPosition::End)
            .unwrap();
    }
    urls
}

#[test]
fn test_full_cycle_visits_every_entry_once() {
    let urls = list_of(4);
    let mut cursor = CycleCursor::at_start(urls.len());
    let mut seen = vec![cursor.index().unwrap()];
    for _ in 0..3 {
        cursor.next(&urls);
        seen.push(cursor.index().unwrap());
    }
    assert_eq!(seen, vec![0, 1, 2, 3]);
    cursor.next(&urls);
    assert_eq!(cursor.index(), Some(0));
}

#[test]
fn test_insert_before_keeps_shown_entry() {
    let mut urls = list_of(3);
    let mut cursor = CycleCursor::at_start(urls.len());
    cursor.next(&urls);
    let shown = cursor.current(&urls).unwrap().clone();

    let index = urls.insert("http://new.example/", InsertPosition::At(0)).unwrap();
    cursor.on_insert(index, urls.len());
    assert_eq!(cursor.current(&urls), Some(&shown));

    cursor.next(&urls);
    assert_eq!(cursor.current(&urls).unwrap().host(), "host2.example");
}

#[test]
fn test_remove_shown_entry_falls_back_to_predecessor() {
    let mut urls = list_of(3);
    let mut cursor = CycleCursor::at_start(urls.len());
    cursor.next(&urls);
    cursor.next(&urls);

    urls.remove(2).unwrap();
    cursor.on_remove(2, urls.len());
    assert_eq!(cursor.index(), Some(1));

    cursor.next(&urls);
    assert_eq!(cursor.index(), Some(0));
}

#[test]
fn test_move_keeps_cursor_on_the_same_entry() {
    let mut urls = list_of(4);
    let mut cursor = CycleCursor::at_start(urls.len());
    cursor.next(&urls);

    // shown entry moves along
    let entry = urls.remove(1).unwrap();
    urls.insert_entry(entry, InsertPosition::At(3));
    cursor.on_move(1, 3, urls.len());
    assert_eq!(cursor.current(&urls).unwrap().host(), "host1.example");

    // another entry moves across it
    let entry = urls.remove(0).unwrap();
    urls.insert_entry(entry, InsertPosition::At(3));
    cursor.on_move(0, 3, urls.len());
    assert_eq!(cursor.current(&urls).unwrap().host(), "host1.example");
}

proptest! {
    #[test]
    fn prop_len_steps_return_to_start(len in 1usize..20, start in 0usize..20, forward in any::<bool>()) {
        let urls = list_of(len);
        let mut cursor = CycleCursor::at_start(len);
        for _ in 0..start % len {
            cursor.next(&urls);
        }
        let origin = cursor.index();
        for _ in 0..len {
            if forward {
                cursor.next(&urls);
            } else {
                cursor.previous(&urls);
            }
        }
        prop_assert_eq!(cursor.index(), origin);
    }

    #[test]
    fn prop_previous_undoes_next(len in 1usize..20, start in 0usize..20) {
        let urls = list_of(len);
        let mut cursor = CycleCursor::at_start(len);
        for _ in 0..start % len {
            cursor.next(&urls);
        }
        let origin = cursor.index();
        cursor.next(&urls);
        cursor.previous(&urls);
        prop_assert_eq!(cursor.index(), origin);
    }

    #[test]
    fn prop_edits_keep_cursor_in_bounds(
        initial in 1usize..10,
        edits in prop::collection::vec((any::<bool>(), 0usize..12), 0..30),
    ) {
        let mut urls = list_of(initial);
        let mut cursor = CycleCursor::at_start(initial);
        for (step, (insert, at)) in edits.into_iter().enumerate() {
            let shown = cursor.current(&urls).cloned();
            if insert {
                let index = urls
                    .insert(&format!("http://edit{step}.example/"), InsertPosition::At(at))
                    .unwrap();
                cursor.on_insert(index, urls.len());
                if shown.is_some() {
                    prop_assert_eq!(cursor.current(&urls).cloned(), shown);
                }
            } else if !urls.is_empty() {
                let index = at % urls.len();
                let removed_shown = cursor.index() == Some(index);
                urls.remove(index).unwrap();
                cursor.on_remove(index, urls.len());
                if !removed_shown && shown.is_some() {
                    prop_assert_eq!(cursor.current(&urls).cloned(), shown);
                }
            }
            match cursor.index() {
                Some(i) => prop_assert!(i < urls.len()),
                None => prop_assert!(urls.is_empty()),
            }
        }
    }
}
