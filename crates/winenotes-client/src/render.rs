//! View models for the form and the collection grid.
//!
//! Pure functions of the state: no I/O, no layout. A front end turns these
//! into widgets.

use serde::Serialize;

use winenotes_shared::{WineEntry, WineId, WineType};

use crate::state::{AppState, FormState};

const STAR: &str = "⭐";

/// Number of stars shown for a 1–10 rating: half the rating, halves round up.
pub fn star_count(rating: u8) -> usize {
    (usize::from(rating) + 1) / 2
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WineCard {
    pub id: WineId,
    pub name: String,
    /// `"Red • 2015"`
    pub subtitle: String,
    pub region: String,
    pub stars: usize,
    pub star_line: String,
    /// `"8/10"`
    pub rating_label: String,
    pub price_label: Option<String>,
    pub notes: Option<String>,
    pub photo_src: Option<String>,
}

impl WineCard {
    pub fn new(entry: &WineEntry, base_url: &str) -> Self {
        let stars = star_count(entry.rating);
        let subtitle = match entry.vintage {
            Some(vintage) => format!("{} • {}", entry.wine_type, vintage),
            None => entry.wine_type.to_string(),
        };

        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            subtitle,
            region: entry.region.clone(),
            stars,
            star_line: STAR.repeat(stars),
            rating_label: format!("{}/10", entry.rating),
            price_label: entry.price.map(|p| format!("${p}")),
            notes: entry.notes.clone().filter(|n| !n.is_empty()),
            photo_src: entry.photo.as_ref().map(|p| p.resolve(base_url)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    pub heading: String,
    pub cards: Vec<WineCard>,
}

pub fn collection_view(wines: &[WineEntry], base_url: &str) -> CollectionView {
    CollectionView {
        heading: format!("Your Wine Collection ({})", wines.len()),
        cards: wines.iter().map(|w| WineCard::new(w, base_url)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub title: &'static str,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
    pub show_cancel: bool,
    pub rating_label: String,
    pub type_options: Vec<&'static str>,
    pub preview_src: Option<String>,
}

pub fn form_view(state: &AppState, base_url: &str) -> FormView {
    let form: &FormState = &state.form;
    let editing = form.is_editing();

    let submit_label = match (state.busy, editing) {
        (true, _) => "Saving...",
        (false, true) => "Update Wine",
        (false, false) => "Add Wine",
    };

    FormView {
        title: if editing { "Edit Wine" } else { "Add New Wine" },
        submit_label,
        submit_disabled: state.busy,
        show_cancel: editing,
        rating_label: format!("{}/10", form.rating),
        type_options: WineType::ALL.iter().map(WineType::as_str).collect(),
        preview_src: form
            .preview
            .as_ref()
            .or(form.photo.as_ref())
            .map(|p| p.resolve(base_url)),
    }
}
