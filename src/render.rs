//! Pure mapping from view state to the card tree.
//!
//! Output depends only on the loading flag, the loaded study, the expanded
//! group and the number locale. While loading, or after a failed load, the
//! tree is empty.

use serde::Serialize;

use crate::domain::{AccessionKind, StudyMetadata, TaxonGroup};
use crate::locale::NumberLocale;
use crate::view::ViewState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fragment", rename_all = "snake_case")]
pub enum Fragment {
    Overview(Overview),
    Links { entries: Vec<LinkEntry> },
    Taxa { rows: Vec<TaxonRow> },
    EcologicalContext(ContextCard),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub title: String,
    pub abstract_text: String,
    pub badges: Vec<Badge>,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Organism,
    TargetGene,
    Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Site,
    Community,
    Reads,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub kind: TileKind,
    pub primary: String,
    pub secondary: String,
}

/// Outbound link; always opened in a new context with no opener access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkEntry {
    pub kind: AccessionKind,
    pub label: String,
    pub identifier: String,
    pub href: String,
    pub new_context: bool,
    pub no_opener: bool,
}

/// Style bucket for a taxon row: first, second, everything after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowVariant {
    Primary,
    Secondary,
    Tertiary,
}

impl RowVariant {
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => RowVariant::Primary,
            1 => RowVariant::Secondary,
            _ => RowVariant::Tertiary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonRow {
    pub index: usize,
    pub variant: RowVariant,
    pub name: String,
    pub description: String,
    pub asv_count: String,
    pub share: String,
    pub expanded: bool,
    pub detail: Option<TaxonDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonDetail {
    pub ecological_role: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextCard {
    pub habitat: String,
    pub depth_range: String,
    pub environmental_factors: String,
    pub study_focus: String,
}

pub fn render(state: &ViewState, locale: NumberLocale) -> Vec<Fragment> {
    if state.loading() {
        return Vec::new();
    }
    match state.metadata() {
        Some(metadata) => render_study(metadata, state.expanded_group(), locale),
        None => Vec::new(),
    }
}

pub fn render_study(
    metadata: &StudyMetadata,
    expanded: Option<&str>,
    locale: NumberLocale,
) -> Vec<Fragment> {
    vec![
        Fragment::Overview(overview(metadata, locale)),
        Fragment::Links {
            entries: links(metadata),
        },
        Fragment::Taxa {
            rows: taxa(&metadata.identified_taxa.major_groups, expanded),
        },
        Fragment::EcologicalContext(context(metadata)),
    ]
}

fn overview(metadata: &StudyMetadata, locale: NumberLocale) -> Overview {
    let study = &metadata.study_information;
    let sample = &metadata.sample_information;
    let sequencing = &metadata.sequencing_information;
    Overview {
        title: study.title.clone(),
        abstract_text: study.abstract_text.clone(),
        badges: vec![
            Badge {
                kind: BadgeKind::Organism,
                text: sample.organism.clone(),
            },
            Badge {
                kind: BadgeKind::TargetGene,
                text: sequencing.target_gene.clone(),
            },
            Badge {
                kind: BadgeKind::Platform,
                text: sequencing.platform.clone(),
            },
        ],
        tiles: vec![
            Tile {
                kind: TileKind::Site,
                primary: sample.location.clone(),
                secondary: sample.sample_type.clone(),
            },
            Tile {
                kind: TileKind::Community,
                primary: sample.target_community.clone(),
                secondary: sample.environment.clone(),
            },
            Tile {
                kind: TileKind::Reads,
                primary: format!("{} reads", locale.group_digits(sequencing.total_spots)),
                secondary: sequencing.read_length.clone(),
            },
        ],
    }
}

fn links(metadata: &StudyMetadata) -> Vec<LinkEntry> {
    AccessionKind::ALL
        .iter()
        .map(|&kind| LinkEntry {
            kind,
            label: kind.label().to_string(),
            identifier: metadata.accession(kind).to_string(),
            href: metadata.link(kind).to_string(),
            new_context: true,
            no_opener: true,
        })
        .collect()
}

fn taxa(groups: &[TaxonGroup], expanded: Option<&str>) -> Vec<TaxonRow> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let is_expanded = expanded == Some(group.name.as_str());
            TaxonRow {
                index,
                variant: RowVariant::for_index(index),
                name: group.name.clone(),
                description: group.description.clone(),
                asv_count: group.asv_count.to_string(),
                share: format!("{}% of ASVs", group.percentage),
                expanded: is_expanded,
                detail: is_expanded.then(|| TaxonDetail {
                    ecological_role: group.ecological_role.clone(),
                    members: group.common_members.clone(),
                }),
            }
        })
        .collect()
}

fn context(metadata: &StudyMetadata) -> ContextCard {
    let ctx = &metadata.identified_taxa.ecological_context;
    ContextCard {
        habitat: ctx.habitat.clone(),
        depth_range: ctx.depth_range.clone(),
        environmental_factors: ctx.environmental_factors.clone(),
        study_focus: ctx.study_focus.clone(),
    }
}
