//! # Property-Based Tests
//!
//! Invariants of the list stores, the wizard and upload validation,
//! checked with proptest.

use ppdb_core::{
    ApplicationQuery, Filter, Portal, UploadCandidate, Wizard, seed, validate_upload,
};
use proptest::prelude::*;

fn pdf(size: u64) -> UploadCandidate {
    UploadCandidate {
        file_name: "rapor.pdf".into(),
        content_type: "application/pdf".into(),
        declared_size: size,
        bytes: None,
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every listed application contains the term in a searched field,
    /// and every application that contains it is listed.
    #[test]
    fn search_is_sound_and_complete(term in "[a-zA-Z0-9@. ]{0,6}") {
        let portal = Portal::seeded();
        let query = ApplicationQuery {
            search: term.clone(),
            status: Filter::All,
        };
        let found: Vec<String> = portal
            .applications
            .list(&query)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        let needle = term.to_lowercase();
        for application in seed::applications() {
            let hit = term.is_empty()
                || [&application.name, &application.id, &application.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            prop_assert_eq!(found.contains(&application.id), hit, "{}", application.id);
        }
    }

    /// Toggling a pin twice restores the original announcement.
    #[test]
    fn pin_toggle_twice_is_identity(index in 0usize..4) {
        let mut portal = Portal::seeded();
        let id = seed::announcements()[index].id.clone();
        let before = portal.announcements.get(&id).expect("seeded").clone();

        portal.announcements.toggle_pin(&id).expect("first toggle");
        portal.announcements.toggle_pin(&id).expect("second toggle");

        prop_assert_eq!(portal.announcements.get(&id).expect("seeded"), &before);
    }

    /// Going back never leaves step 1, whatever the sequence of moves.
    #[test]
    fn retreat_never_below_first_step(moves in proptest::collection::vec(any::<bool>(), 0..30)) {
        let mut wizard = Wizard::new(None, chrono::NaiveDateTime::default());
        for forward in moves {
            if forward {
                let _ = wizard.advance();
            } else {
                wizard.retreat();
            }
            prop_assert!(wizard.step.number() >= 1);
        }
        // nothing is filled in, so advancing never succeeds
        prop_assert_eq!(wizard.step.number(), 1);
    }

    /// A file is accepted exactly when its size is within the limit.
    #[test]
    fn upload_size_boundary(max in 1u64..10_000_000, delta in 0u64..3) {
        prop_assert!(validate_upload(&pdf(max), max).is_ok());
        prop_assert!(validate_upload(&pdf(max.saturating_sub(delta).max(1)), max).is_ok());
        prop_assert!(validate_upload(&pdf(max + 1 + delta), max).is_err());
    }
}
