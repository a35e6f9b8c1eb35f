#[cfg(test)]
mod test {
    use crate::destination::ROUTE_SEPARATOR;
    use crate::prelude::*;
    use crate::tests::toolkit::destination;
    use rand::Rng;

    fn set_of(titles: &[&str]) -> DestinationSet {
        DestinationSet::from_destinations(
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| destination(t, 35.0 + i as f64 * 0.01, 135.0))
                .collect(),
        )
    }

    fn titles(set: &DestinationSet) -> Vec<&str> {
        set.destinations()
            .iter()
            .map(|d| d.title().unwrap_or(""))
            .collect()
    }

    fn apply(set: &DestinationSet, mutation: Mutation) -> (DestinationSet, Vec<SetEvent>) {
        set.apply(mutation).unwrap()
    }

    fn cursor_is_valid(set: &DestinationSet) -> bool {
        match set.target_index() {
            None => set.is_empty(),
            Some(index) => index < set.len(),
        }
    }

    #[test]
    fn remove_single_target() {
        let set = set_of(&["A"]);
        assert_eq!(set.target_index(), Some(0));
        let (set, events) = apply(&set, Mutation::Remove(0));
        assert!(set.is_empty());
        assert_eq!(set.target_index(), None);
        assert!(set.target().is_none());
        assert_eq!(
            events,
            vec![
                SetEvent::DestinationsChanged,
                SetEvent::TargetIndexChanged(None),
                SetEvent::TargetChanged(None),
            ]
        );
    }
    #[test]
    fn remove_before_target() {
        let set = set_of(&["A", "B", "C"]);
        let (set, _) = apply(&set, Mutation::SetTarget(1));
        let b = set.target_id().unwrap();

        let (set, events) = apply(&set, Mutation::Remove(0));
        assert_eq!(titles(&set), vec!["B", "C"]);
        assert_eq!(set.target_index(), Some(0));
        assert_eq!(set.target_id(), Some(b));
        assert_eq!(
            events,
            vec![SetEvent::DestinationsChanged, SetEvent::TargetIndexChanged(Some(0))]
        );
    }
    #[test]
    fn remove_target_advances_identity() {
        let set = set_of(&["A", "B", "C"]);
        let (set, _) = apply(&set, Mutation::SetTarget(1));
        let c = set.destinations()[2].id();

        let (set, events) = apply(&set, Mutation::Remove(1));
        assert_eq!(titles(&set), vec!["A", "C"]);
        // same cursor, different destination
        assert_eq!(set.target_index(), Some(1));
        assert_eq!(set.target_id(), Some(c));
        assert_eq!(
            events,
            vec![SetEvent::DestinationsChanged, SetEvent::TargetChanged(Some(c))]
        );
    }
    #[test]
    fn remove_last_target_clamps() {
        let set = set_of(&["A", "B", "C"]);
        let (set, _) = apply(&set, Mutation::SetTarget(2));
        let (set, _) = apply(&set, Mutation::Remove(2));
        assert_eq!(set.target_index(), Some(1));
        assert_eq!(set.target().and_then(|d| d.title()), Some("B"));
    }
    #[test]
    fn moving_keeps_target() {
        let set = set_of(&["A", "B", "C", "D"]);
        let (set, _) = apply(&set, Mutation::SetTarget(1));
        let (set, events) = apply(&set, Mutation::Move { from: 1, to: 3 });
        assert_eq!(titles(&set), vec!["A", "C", "D", "B"]);
        assert_eq!(set.target_index(), Some(3));
        assert_eq!(set.target().and_then(|d| d.title()), Some("B"));
        assert!(!events.iter().any(|e| matches!(e, SetEvent::TargetChanged(_))));
    }
    #[test]
    fn insertion() {
        let set = set_of(&["A", "C"]);
        let (set, _) = apply(&set, Mutation::SetTarget(1));
        let (set, _) = apply(&set, Mutation::Insert(1, destination("B", 0.0, 0.0)));
        assert_eq!(titles(&set), vec!["A", "B", "C"]);
        assert_eq!(set.target().and_then(|d| d.title()), Some("C"));
        let (set, _) = apply(&set, Mutation::Insert(3, destination("D", 0.0, 0.0)));
        assert_eq!(titles(&set), vec!["A", "B", "C", "D"]);
        assert!(matches!(
            set.apply(Mutation::Insert(5, destination("E", 0.0, 0.0))),
            Err(Error::InvalidIndex(5))
        ));
    }
    #[test]
    fn first_append_targets() {
        let set = DestinationSet::default();
        assert_eq!(set.target_index(), None);
        let (set, events) = apply(&set, Mutation::Append(destination("A", 1.0, 2.0)));
        assert_eq!(set.target_index(), Some(0));
        assert_eq!(events.len(), 3);
    }
    #[test]
    fn retitle_keeps_identity() {
        let set = set_of(&["A", "B"]);
        let id = set.destinations()[0].id();
        let (set, events) = apply(&set, Mutation::Retitle(0, Some("Z".to_string())));
        assert_eq!(titles(&set), vec!["Z", "B"]);
        assert_eq!(set.destinations()[0].id(), id);
        assert_eq!(events, vec![SetEvent::DestinationsChanged]);
    }
    #[test]
    fn replace_and_clear() {
        let set = set_of(&["A", "B"]);
        let (set, events) = apply(&set, Mutation::Replace(vec![destination("X", 0.0, 0.0)]));
        assert_eq!(titles(&set), vec!["X"]);
        assert_eq!(set.target_index(), Some(0));
        assert!(events.contains(&SetEvent::TargetChanged(set.target_id())));

        let (set, _) = apply(&set, Mutation::Clear);
        assert!(set.is_empty());
        assert_eq!(set.target_index(), None);
    }
    #[test]
    fn invalid_indexes() {
        let set = set_of(&["A"]);
        assert!(matches!(set.apply(Mutation::Remove(1)), Err(Error::InvalidIndex(1))));
        assert!(matches!(set.apply(Mutation::SetTarget(1)), Err(Error::InvalidIndex(1))));
        assert!(matches!(
            set.apply(Mutation::Move { from: 0, to: 4 }),
            Err(Error::InvalidIndex(4))
        ));
        assert!(matches!(
            set.apply(Mutation::Retitle(2, None)),
            Err(Error::InvalidIndex(2))
        ));
    }
    #[test]
    fn circular_stepping() {
        let set = set_of(&["A", "B", "C"]);
        let (set, _) = apply(&set, Mutation::Step(-1));
        assert_eq!(set.target_index(), Some(2));
        let (set, _) = apply(&set, Mutation::Step(1));
        assert_eq!(set.target_index(), Some(0));
        let (set, _) = apply(&set, Mutation::Step(7));
        assert_eq!(set.target_index(), Some(1));

        let empty = DestinationSet::default();
        let (empty, events) = apply(&empty, Mutation::Step(1));
        assert_eq!(empty.target_index(), None);
        assert!(events.is_empty());
    }
    #[test]
    fn forward_backward_inverse() {
        let mut rng = rand::thread_rng();
        for len in 1..8 {
            let set = DestinationSet::from_destinations(
                (0..len).map(|i| destination("x", i as f64, 0.0)).collect(),
            );
            let start = rng.gen_range(0..len);
            let (set, _) = apply(&set, Mutation::SetTarget(start));
            let (forward, _) = apply(&set, Mutation::Step(1));
            let (back, _) = apply(&forward, Mutation::Step(-1));
            assert_eq!(back.target_index(), Some(start));
            let (backward, _) = apply(&set, Mutation::Step(-1));
            let (forth, _) = apply(&backward, Mutation::Step(1));
            assert_eq!(forth.target_index(), Some(start));
        }
    }
    #[test]
    fn cursor_invariant() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut set = DestinationSet::default();
            for _ in 0..50 {
                let len = set.len();
                let mutation = match rng.gen_range(0..9) {
                    0 | 1 => Mutation::Append(destination("d", rng.gen(), rng.gen())),
                    2 => Mutation::Insert(
                        rng.gen_range(0..=len),
                        destination("i", rng.gen(), rng.gen()),
                    ),
                    3 | 4 if len > 0 => Mutation::Remove(rng.gen_range(0..len)),
                    5 if len > 0 => Mutation::Move {
                        from: rng.gen_range(0..len),
                        to: rng.gen_range(0..len),
                    },
                    6 if len > 0 => Mutation::SetTarget(rng.gen_range(0..len)),
                    7 => Mutation::Step(rng.gen_range(-5..=5)),
                    8 if rng.gen_bool(0.1) => Mutation::Clear,
                    _ => Mutation::Replace(
                        set.destinations()
                            .iter()
                            .filter(|_| rng.gen_bool(0.7))
                            .cloned()
                            .collect(),
                    ),
                };
                let described = format!("{:?}", mutation);
                let (next, events) = set.apply(mutation).unwrap();
                assert!(
                    cursor_is_valid(&next),
                    "invalid cursor {:?} ({} destinations) after {}",
                    next.target_index(),
                    next.len(),
                    described
                );
                let changed = next.target_id() != set.target_id();
                assert_eq!(
                    changed,
                    events.iter().any(|e| matches!(e, SetEvent::TargetChanged(_)))
                );
                set = next;
            }
        }
    }
    #[test]
    fn route_summary() {
        let set = set_of(&["Station", "Temple", "Shrine"]);
        assert_eq!(
            set.route_summary().unwrap(),
            format!("Shrine{}Temple{}Station", ROUTE_SEPARATOR, ROUTE_SEPARATOR)
        );
        let (set, _) = apply(&set, Mutation::Retitle(1, None));
        assert_eq!(set.route_summary().unwrap(), "Shrine ← Station");
        let (set, _) = apply(&set, Mutation::Replace(vec![Destination::at(Coordinates::default())]));
        assert!(set.route_summary().is_none());
    }
}
