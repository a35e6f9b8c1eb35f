#[cfg(test)]
mod test {
    use crate::prelude::*;
    use crate::tests::toolkit::{destination, temp_dir};

    fn titles(destinations: &[Destination]) -> Vec<&str> {
        destinations.iter().filter_map(|d| d.title()).collect()
    }

    #[test]
    fn streams_replay_current_value() {
        let mut store = DestinationStore::default();
        store.append(destination("A", 1.0, 1.0)).unwrap();
        store.append(destination("B", 2.0, 2.0)).unwrap();

        let mut destinations = store.subscribe_destinations();
        let mut index = store.subscribe_target_index();
        let mut target = store.subscribe_target();
        assert!(destinations.has_changed().unwrap());
        assert!(index.has_changed().unwrap());
        assert!(target.has_changed().unwrap());

        assert_eq!(titles(&destinations.borrow_and_update()), vec!["A", "B"]);
        assert_eq!(*index.borrow_and_update(), Some(0));
        assert_eq!(
            target.borrow_and_update().as_ref().and_then(|d| d.title()),
            Some("A")
        );
        assert!(!destinations.has_changed().unwrap());
    }
    #[test]
    fn streams_follow_mutations() {
        let mut store = DestinationStore::default();
        let mut index = store.subscribe_target_index();
        let mut target = store.subscribe_target();
        let mut destinations = store.subscribe_destinations();
        index.borrow_and_update();
        target.borrow_and_update();
        destinations.borrow_and_update();

        store.append(destination("A", 1.0, 1.0)).unwrap();
        store.append(destination("B", 2.0, 2.0)).unwrap();
        store.append(destination("C", 3.0, 3.0)).unwrap();
        assert!(destinations.has_changed().unwrap());
        assert_eq!(destinations.borrow_and_update().len(), 3);
        assert_eq!(*index.borrow_and_update(), Some(0));
        target.borrow_and_update();

        store.go_forward().unwrap();
        assert_eq!(*index.borrow_and_update(), Some(1));
        assert!(target.has_changed().unwrap());
        assert_eq!(store.target().and_then(|d| d.title()), Some("B"));
        target.borrow_and_update();
        assert!(!destinations.has_changed().unwrap());

        // target removed: same cursor, new target
        store.remove(1).unwrap();
        assert!(!index.has_changed().unwrap());
        assert!(target.has_changed().unwrap());
        assert_eq!(
            target.borrow_and_update().as_ref().and_then(|d| d.title()),
            Some("C")
        );

        // renaming the target is a target change too
        store.retitle(1, Some("Z".to_string())).unwrap();
        assert!(target.has_changed().unwrap());
        assert_eq!(
            target.borrow_and_update().as_ref().and_then(|d| d.title()),
            Some("Z")
        );

        // untouched target
        store.retitle(0, Some("Y".to_string())).unwrap();
        assert!(!target.has_changed().unwrap());

        store.go_backward().unwrap();
        store.go_backward().unwrap();
        assert_eq!(*index.borrow_and_update(), Some(1));
        store.clear().unwrap();
        assert_eq!(*index.borrow_and_update(), None);
        assert!(target.borrow_and_update().is_none());
    }
    #[test]
    fn set_switching() {
        let mut store = DestinationStore::default();
        store.append(destination("A", 1.0, 1.0)).unwrap();
        let first = store.current().id();
        let mut target = store.subscribe_target();
        target.borrow_and_update();

        let second = store.start_new_set(Some("second".to_string())).unwrap();
        assert_eq!(store.current().id(), second);
        assert!(target.borrow_and_update().is_none());
        store.append(destination("B", 2.0, 2.0)).unwrap();
        assert_eq!(store.route_summary().as_deref(), Some("B"));

        store.select(first).unwrap();
        assert_eq!(store.current().id(), first);
        assert_eq!(
            target.borrow_and_update().as_ref().and_then(|d| d.title()),
            Some("A")
        );
        assert_eq!(store.catalog().others()[0].id(), second);

        store.rename(Some("first".to_string())).unwrap();
        store.set_note(Some("note".to_string())).unwrap();
        assert_eq!(store.current().name(), Some("first"));
        assert_eq!(store.current().note(), Some("note"));

        let removed = store.remove_set(first).unwrap();
        assert_eq!(removed.id(), first);
        assert_eq!(store.current().id(), second);
        assert_eq!(
            target.borrow_and_update().as_ref().and_then(|d| d.title()),
            Some("B")
        );
    }
    #[test]
    fn persistence() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("destinations.json");

        let mut store = DestinationStore::open(&path).unwrap();
        assert!(store.current().is_empty());
        store.append(destination("A", 1.0, 1.0)).unwrap();
        store.append(destination("B", 2.0, 2.0)).unwrap();
        store.go_forward().unwrap();
        store.rename(Some("trip".to_string())).unwrap();
        assert!(path.exists());

        let reopened = DestinationStore::open(&path).unwrap();
        assert!(reopened.catalog().same_value(store.catalog()));
        assert_eq!(reopened.current().target_index(), Some(0));

        // reload picks up external changes
        std::fs::write(&path, "[]").unwrap();
        store.load_all().unwrap();
        assert!(store.current().is_empty());
        assert!(store.current().name().is_none());

        // memory only store never touches the disk
        let mut memory = DestinationStore::default();
        memory.append(destination("A", 1.0, 1.0)).unwrap();
        memory.save_all().unwrap();
        memory.load_all().unwrap();
        assert_eq!(memory.current().len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
    #[test]
    fn rejected_mutation() {
        let mut store = DestinationStore::default();
        let mut destinations = store.subscribe_destinations();
        destinations.borrow_and_update();
        assert!(matches!(store.remove(0), Err(Error::InvalidIndex(0))));
        assert!(matches!(store.set_target_index(2), Err(Error::InvalidIndex(2))));
        assert!(!destinations.has_changed().unwrap());
    }
}
