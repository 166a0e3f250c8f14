//! Admin form view model.
//!
//! Presentation data only: one selector per catalog feature offering the
//! three origins, the current selection and the catalog default marked.
//! Rendering lives with the host.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::header::resolve;
use crate::origin::Origin;
use crate::settings::SettingsSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    pub token: &'static str,
    pub label: &'static str,
    pub selected: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub name: String,
    pub title: String,
    pub choices: Vec<ChoiceView>,
}

impl FieldView {
    pub fn selected(&self) -> Option<&ChoiceView> {
        self.choices.iter().find(|c| c.selected)
    }
}

/// One field per catalog feature, in catalog order.
pub fn fields(catalog: &Catalog, settings: &SettingsSnapshot) -> Vec<FieldView> {
    resolve(catalog, settings)
        .into_iter()
        .map(|r| FieldView {
            name: r.feature.name.clone(),
            title: r.feature.title.clone(),
            choices: Origin::ALL
                .iter()
                .map(|&o| ChoiceView {
                    token: o.as_token(),
                    label: o.label(),
                    selected: o == r.origin,
                    is_default: o == r.feature.default_origin,
                })
                .collect(),
        })
        .collect()
}
