use specboard::engine::dependencies::*;
use specboard::models::*;
use speculate2::speculate;

fn bolt(id: &str, status: ArtifactStatus, requires: &[&str]) -> Bolt {
    Bolt {
        id: id.to_string(),
        status,
        requires_bolts: requires.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
}

fn find<'a>(bolts: &'a [Bolt], id: &str) -> &'a Bolt {
    bolts.iter().find(|b| b.id == id).expect("bolt not found")
}

fn ids(bolts: &[Bolt]) -> Vec<&str> {
    bolts.iter().map(|b| b.id.as_str()).collect()
}

speculate! {
    describe "compute_bolt_dependencies" {
        use pretty_assertions::assert_eq;

        it "does not block on a completed prerequisite" {
            let resolved = compute_bolt_dependencies(&[
                bolt("a", ArtifactStatus::Complete, &[]),
                bolt("b", ArtifactStatus::Draft, &["a"]),
            ]);

            let b = find(&resolved, "b");
            assert!(!b.is_blocked);
            assert!(b.blocked_by.is_empty());
            assert_eq!(find(&resolved, "a").unblocks_count, 0);
        }

        it "blocks on an incomplete prerequisite and counts the dependent" {
            let resolved = compute_bolt_dependencies(&[
                bolt("a", ArtifactStatus::Draft, &[]),
                bolt("b", ArtifactStatus::Draft, &["a"]),
            ]);

            let b = find(&resolved, "b");
            assert!(b.is_blocked);
            assert_eq!(b.blocked_by, vec!["a".to_string()]);
            assert_eq!(find(&resolved, "a").unblocks_count, 1);
            assert_eq!(b.unblocks_count, 0);
        }

        it "treats an unknown prerequisite id as blocking" {
            let resolved = compute_bolt_dependencies(&[bolt("b", ArtifactStatus::Draft, &["ghost"])]);

            let b = find(&resolved, "b");
            assert!(b.is_blocked);
            assert_eq!(b.blocked_by, vec!["ghost".to_string()]);
        }

        it "ignores a bolt requiring itself" {
            let resolved = compute_bolt_dependencies(&[bolt("a", ArtifactStatus::Draft, &["a"])]);

            let a = find(&resolved, "a");
            assert!(!a.is_blocked);
            assert_eq!(a.unblocks_count, 0);
        }

        it "does not count completed dependents as waiting" {
            let resolved = compute_bolt_dependencies(&[
                bolt("a", ArtifactStatus::InProgress, &[]),
                bolt("b", ArtifactStatus::Complete, &["a"]),
                bolt("c", ArtifactStatus::Draft, &["a"]),
            ]);

            assert_eq!(find(&resolved, "a").unblocks_count, 1);
        }

        it "preserves input order and length" {
            let input = vec![
                bolt("z", ArtifactStatus::Draft, &[]),
                bolt("a", ArtifactStatus::Draft, &["z"]),
                bolt("m", ArtifactStatus::Complete, &[]),
            ];
            let resolved = compute_bolt_dependencies(&input);
            assert_eq!(ids(&resolved), vec!["z", "a", "m"]);
        }

        it "lists every incomplete prerequisite in declaration order" {
            let resolved = compute_bolt_dependencies(&[
                bolt("a", ArtifactStatus::Draft, &[]),
                bolt("b", ArtifactStatus::Complete, &[]),
                bolt("c", ArtifactStatus::InProgress, &[]),
                bolt("d", ArtifactStatus::Draft, &["c", "b", "a"]),
            ]);

            assert_eq!(
                find(&resolved, "d").blocked_by,
                vec!["c".to_string(), "a".to_string()]
            );
        }
    }

    describe "get_up_next_bolts" {
        use pretty_assertions::assert_eq;

        it "puts unblocked bolts first, ordered by how much they unblock" {
            let mut x = bolt("x", ArtifactStatus::Draft, &["w"]);
            x.is_blocked = true;
            x.blocked_by = vec!["w".to_string()];
            let mut y = bolt("y", ArtifactStatus::Draft, &[]);
            y.unblocks_count = 2;
            let z = bolt("z", ArtifactStatus::Draft, &[]);

            let queue = get_up_next_bolts(&[x, y, z]);
            assert_eq!(ids(&queue), vec!["y", "z", "x"]);
        }

        it "breaks ties by id" {
            let queue = get_up_next_bolts(&[
                bolt("c", ArtifactStatus::Draft, &[]),
                bolt("a", ArtifactStatus::Draft, &[]),
                bolt("b", ArtifactStatus::Draft, &[]),
            ]);
            assert_eq!(ids(&queue), vec!["a", "b", "c"]);
        }

        it "keeps bolts whose own status is blocked" {
            let queue = get_up_next_bolts(&[
                bolt("a", ArtifactStatus::Blocked, &[]),
                bolt("b", ArtifactStatus::InProgress, &[]),
                bolt("c", ArtifactStatus::Complete, &[]),
            ]);
            assert_eq!(ids(&queue), vec!["a"]);
        }

        it "returns an empty queue for no bolts" {
            assert!(get_up_next_bolts(&[]).is_empty());
        }
    }

    describe "single bolt queries" {
        use pretty_assertions::assert_eq;

        before {
            let all = vec![
                bolt("a", ArtifactStatus::Draft, &[]),
                bolt("b", ArtifactStatus::Complete, &[]),
                bolt("c", ArtifactStatus::Draft, &["a", "b"]),
                bolt("d", ArtifactStatus::InProgress, &["a"]),
            ];
        }

        it "reports blocking bolts" {
            assert_eq!(get_blocking_bolts(&all[2], &all), vec!["a".to_string()]);
            assert!(is_bolt_blocked(&all[2], &all));
            assert!(!is_bolt_blocked(&all[0], &all));
        }

        it "counts incomplete dependents" {
            assert_eq!(count_unblocks(&all[0], &all), 2);
            assert_eq!(count_unblocks(&all[1], &all), 0);
        }
    }
}
