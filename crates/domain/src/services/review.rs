//! Review eligibility rules.

use uuid::Uuid;

use crate::errors::DomainError;
use crate::models::ReservationStatus;

/// What the review workflow knows about the reviewed reservation.
#[derive(Debug, Clone, Copy)]
pub struct ReviewTarget {
    pub client_id: Uuid,
    pub statut: ReservationStatus,
    pub already_reviewed: bool,
}

/// Checks that `client_id` may rate the reservation with `note`.
pub fn check_eligibility(
    target: &ReviewTarget,
    client_id: Uuid,
    note: i32,
) -> Result<(), DomainError> {
    if target.client_id != client_id {
        return Err(DomainError::not_found("Réservation introuvable"));
    }
    if target.statut != ReservationStatus::Terminee {
        return Err(DomainError::InvalidState(
            "Seule une réservation terminée peut être notée".into(),
        ));
    }
    if target.already_reviewed {
        return Err(DomainError::DuplicateReview);
    }
    shared::validation::validate_note(note).map_err(|e| {
        DomainError::validation(
            e.message
                .map(|m| m.into_owned())
                .unwrap_or_else(|| "Note invalide".into()),
        )
    })
}

/// Only unmoderated reviews can be moderated.
pub fn check_moderatable(is_moderated: bool) -> Result<(), DomainError> {
    if is_moderated {
        Err(DomainError::InvalidState("Cet avis a déjà été modéré".into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(client_id: Uuid, statut: ReservationStatus) -> ReviewTarget {
        ReviewTarget {
            client_id,
            statut,
            already_reviewed: false,
        }
    }

    #[test]
    fn test_completed_reservation_can_be_rated() {
        let client = Uuid::new_v4();
        assert!(check_eligibility(&target(client, ReservationStatus::Terminee), client, 4).is_ok());
    }

    #[test]
    fn test_other_client_sees_not_found() {
        let result = check_eligibility(
            &target(Uuid::new_v4(), ReservationStatus::Terminee),
            Uuid::new_v4(),
            4,
        );
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_unfinished_reservation() {
        let client = Uuid::new_v4();
        for statut in [
            ReservationStatus::EnAttente,
            ReservationStatus::Confirmee,
            ReservationStatus::Annulee,
            ReservationStatus::Refusee,
        ] {
            assert!(matches!(
                check_eligibility(&target(client, statut), client, 5),
                Err(DomainError::InvalidState(_))
            ));
        }
    }

    #[test]
    fn test_second_review_rejected() {
        let client = Uuid::new_v4();
        let mut reviewed = target(client, ReservationStatus::Terminee);
        reviewed.already_reviewed = true;
        assert_eq!(
            check_eligibility(&reviewed, client, 5),
            Err(DomainError::DuplicateReview)
        );
    }

    #[test]
    fn test_note_out_of_range() {
        let client = Uuid::new_v4();
        let t = target(client, ReservationStatus::Terminee);
        assert_eq!(
            check_eligibility(&t, client, 6),
            Err(DomainError::Validation(
                "La note doit être comprise entre 1 et 5".into()
            ))
        );
        assert!(check_eligibility(&t, client, 0).is_err());
    }

    #[test]
    fn test_check_moderatable() {
        assert!(check_moderatable(false).is_ok());
        assert!(matches!(
            check_moderatable(true),
            Err(DomainError::InvalidState(_))
        ));
    }
}
