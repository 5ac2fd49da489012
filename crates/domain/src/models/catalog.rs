//! Catalog models: categories and public provider profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SousCategorie {
    pub id: Uuid,
    pub categorie_id: Uuid,
    pub nom: String,
}

/// Active category with its active sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Categorie {
    pub id: Uuid,
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sous_categories: Vec<SousCategorie>,
}

/// Public view of a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prestataire {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nom_commercial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    pub pays: String,
    pub is_verified: bool,
    pub note_moyenne: f64,
    pub nombre_avis: i32,
    pub created_at: DateTime<Utc>,
}

/// Groups sub-categories under their parent, keeping the parents' order.
pub fn group_categories(
    categories: Vec<(Uuid, String, Option<String>)>,
    sous_categories: Vec<SousCategorie>,
) -> Vec<Categorie> {
    let mut grouped: Vec<Categorie> = categories
        .into_iter()
        .map(|(id, nom, description)| Categorie {
            id,
            nom,
            description,
            sous_categories: Vec::new(),
        })
        .collect();

    for sous in sous_categories {
        if let Some(parent) = grouped.iter_mut().find(|c| c.id == sous.categorie_id) {
            parent.sous_categories.push(sous);
        }
    }

    grouped
}
