use observable_map::{Error, Key, ObservableMap, entries};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn logged(map: &mut ObservableMap<i32>) -> Log {
    let log: Log = Rc::default();
    let sink = log.clone();
    map.set_change_callback(move |map, key, value| {
        sink.borrow_mut().push(format!("{key}={value} (len {})", map.len()));
        Ok(())
    });
    log
}

#[test]
fn callback_receives_map_key_and_value() {
    let mut map = ObservableMap::new();
    let log = logged(&mut map);

    map.set("a", 1).unwrap();

    assert_eq!(*log.borrow(), ["a=1 (len 1)"]);
}

#[test]
fn appends_are_sequential_from_empty() {
    let mut map = ObservableMap::new();
    let log = logged(&mut map);

    let first = map.push(10).unwrap();
    let second = map.push(20).unwrap();

    assert_eq!((first, second), (Key::index(0), Key::index(1)));
    assert_eq!(*log.borrow(), ["0=10 (len 1)", "1=20 (len 2)"]);
}

#[test]
fn append_after_remove_can_overwrite() {
    let mut map = ObservableMap::from_entries(entries! { 0 => 'a', 1 => 'b' });
    map.remove(&0);

    // One entry left, so the next append key is 1.
    assert_eq!(map.push('c').unwrap(), Key::index(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&'c'));
}

#[test]
fn iteration_follows_insertion_order() {
    let map = ObservableMap::from_entries([("x", 1), ("y", 2), ("z", 3)]);

    let keys: Vec<String> = map.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, ["x", "y", "z"]);

    let values: Vec<i32> = (&map).into_iter().map(|(_, v)| *v).collect();
    assert_eq!(values, [1, 2, 3]);
}

#[test]
fn rewinding_mid_walk_restarts() {
    let mut map = ObservableMap::from_entries([("x", 1), ("y", 2), ("z", 3)]);

    assert_eq!(map.key(), Some(&Key::from("x")));
    map.advance();
    assert_eq!(map.key(), Some(&Key::from("y")));

    let first = map.rewind().map(|(k, v)| (k.clone(), *v));
    assert_eq!(first, Some((Key::from("x"), 1)));
    assert_eq!(map.key(), Some(&Key::from("x")));
}

#[test]
fn cursor_and_iter_are_independent() {
    let mut map = ObservableMap::from_entries([("x", 1), ("y", 2)]);
    map.advance();

    assert_eq!(map.iter().count(), 2);
    assert_eq!(map.key(), Some(&Key::from("y")));
}

#[test]
fn overwrite_keeps_position() {
    let mut map = ObservableMap::from_entries([("x", 1), ("y", 2), ("z", 3)]);
    map.set("x", 100).unwrap();

    let entries: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    assert_eq!(
        entries,
        [("x".to_string(), 100), ("y".to_string(), 2), ("z".to_string(), 3)]
    );
}

#[test]
fn callback_error_reaches_caller() {
    let mut map = ObservableMap::new();
    map.set_change_callback(|_, key, _: &i32| {
        if key.as_name() == Some("readonly") {
            return Err(format!("{key} is read-only").into());
        }
        Ok(())
    });

    map.set("ok", 1).unwrap();
    let err = map.set("readonly", 2).unwrap_err();

    match err {
        Error::ChangeCallback { key, source } => {
            assert_eq!(key, Key::from("readonly"));
            assert_eq!(source.to_string(), "readonly is read-only");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn export_round_trips_entries() {
    let initial = entries! { "b" => 2, "a" => 1, 7 => 0 };
    let map = ObservableMap::from_entries(initial.clone());

    assert_eq!(map.to_entries(), initial);
    assert_eq!(map.into_entries(), initial);
}

#[test]
fn name_key_spelling_an_integer_is_the_same_entry() {
    let mut map = ObservableMap::new();
    map.set(Key::name("5"), 1).unwrap();
    map.set(5, 2).unwrap();

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("5"), Some(&2));
    assert_eq!(map.keys().next().and_then(Key::as_index), Some(5));

    let record: serde_json::Value = map.to_record().unwrap();
    assert_eq!(record, serde_json::json!({"5": 2}));
}
