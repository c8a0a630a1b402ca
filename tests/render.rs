use std::fs;

use kira_study_viewer::diagnostics::RecordingSink;
use kira_study_viewer::domain::{AccessionKind, StudyMetadata};
use kira_study_viewer::locale::NumberLocale;
use kira_study_viewer::render::{BadgeKind, Fragment, RowVariant, TaxonRow, render};
use kira_study_viewer::view::ViewState;

fn fixture() -> StudyMetadata {
    let raw = fs::read_to_string("tests/fixtures/study_metadata.json").unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn loaded() -> ViewState {
    let mut state = ViewState::new();
    state.apply_load(Ok(fixture()), "fixture", &RecordingSink::new());
    state
}

fn rows(fragments: &[Fragment]) -> Vec<TaxonRow> {
    fragments
        .iter()
        .find_map(|fragment| match fragment {
            Fragment::Taxa { rows } => Some(rows.clone()),
            _ => None,
        })
        .unwrap()
}

fn expanded_rows(fragments: &[Fragment]) -> Vec<String> {
    rows(fragments)
        .into_iter()
        .filter(|row| row.detail.is_some())
        .map(|row| row.name)
        .collect()
}

#[test]
fn fragments_come_in_fixed_order() {
    let fragments = render(&loaded(), NumberLocale::En);
    assert_eq!(fragments.len(), 4);
    assert!(matches!(fragments[0], Fragment::Overview(_)));
    assert!(matches!(fragments[1], Fragment::Links { .. }));
    assert!(matches!(fragments[2], Fragment::Taxa { .. }));
    assert!(matches!(fragments[3], Fragment::EcologicalContext(_)));
}

#[test]
fn overview_badges_and_read_tile() {
    let fragments = render(&loaded(), NumberLocale::En);
    let Fragment::Overview(overview) = &fragments[0] else {
        panic!("overview first");
    };
    assert_eq!(
        overview.title,
        "Bacterioplankton community of a meromictic coastal lake"
    );
    let badges = overview
        .badges
        .iter()
        .map(|badge| (badge.kind, badge.text.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        badges,
        vec![
            (BadgeKind::Organism, "freshwater metagenome"),
            (BadgeKind::TargetGene, "16S rRNA V3-V4"),
            (BadgeKind::Platform, "Illumina MiSeq"),
        ]
    );
    assert_eq!(overview.tiles.len(), 3);
    assert_eq!(overview.tiles[0].primary, "Lake Shira, Khakassia");
    assert_eq!(overview.tiles[0].secondary, "filtered water");
    assert_eq!(overview.tiles[1].primary, "Bacteria and Archaea");
    assert_eq!(overview.tiles[2].primary, "1,234,567 reads");
    assert_eq!(overview.tiles[2].secondary, "2x300 bp");
}

#[test]
fn read_tile_follows_locale() {
    let fragments = render(&loaded(), NumberLocale::De);
    let Fragment::Overview(overview) = &fragments[0] else {
        panic!("overview first");
    };
    assert_eq!(overview.tiles[2].primary, "1.234.567 reads");
}

#[test]
fn links_match_ncbi_links_in_fixed_order() {
    let meta = fixture();
    let fragments = render(&loaded(), NumberLocale::En);
    let Fragment::Links { entries } = &fragments[1] else {
        panic!("links second");
    };
    let labels = entries
        .iter()
        .map(|entry| entry.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            "BioProject",
            "BioSample",
            "SRA Study",
            "SRA Experiment",
            "SRA Run",
            "Taxonomy"
        ]
    );
    assert_eq!(entries[0].href, meta.ncbi_links.bioproject);
    assert_eq!(entries[1].href, meta.ncbi_links.biosample);
    assert_eq!(entries[2].href, meta.ncbi_links.sra_study);
    assert_eq!(entries[3].href, meta.ncbi_links.sra_experiment);
    assert_eq!(entries[4].href, meta.ncbi_links.sra_run);
    assert_eq!(entries[5].href, meta.ncbi_links.taxonomy);
    assert_eq!(entries[0].identifier, "PRJNA812345");
    assert_eq!(entries[4].identifier, "SRR18012345");
    assert_eq!(entries[5].identifier, "449393");
    assert_eq!(entries[5].kind, AccessionKind::Taxonomy);
    assert!(entries.iter().all(|entry| entry.new_context && entry.no_opener));
}

#[test]
fn taxon_rows_keep_source_order_and_style_buckets() {
    let rows = rows(&render(&loaded(), NumberLocale::En));
    let names = rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Proteobacteria", "Bacteroidota", "Chlorobi", "Cyanobacteria"]
    );
    let variants = rows.iter().map(|row| row.variant).collect::<Vec<_>>();
    assert_eq!(
        variants,
        vec![
            RowVariant::Primary,
            RowVariant::Secondary,
            RowVariant::Tertiary,
            RowVariant::Tertiary
        ]
    );
    assert_eq!(rows[0].asv_count, "412");
    assert_eq!(rows[0].share, "38.5% of ASVs");
    assert_eq!(rows[1].share, "21% of ASVs");
    assert!(rows.iter().all(|row| row.detail.is_none()));
}

#[test]
fn expansion_toggles_a_single_panel() {
    let mut state = loaded();
    state.toggle_group("Bacteroidota");
    assert_eq!(
        expanded_rows(&render(&state, NumberLocale::En)),
        vec!["Bacteroidota"]
    );

    state.toggle_group("Bacteroidota");
    assert!(expanded_rows(&render(&state, NumberLocale::En)).is_empty());

    state.toggle_group("Bacteroidota");
    state.toggle_group("Chlorobi");
    let fragments = render(&state, NumberLocale::En);
    assert_eq!(expanded_rows(&fragments), vec!["Chlorobi"]);
    let rows = rows(&fragments);
    assert!(rows[2].expanded);
    assert!(!rows[1].expanded);
}

#[test]
fn member_chips_keep_order_and_duplicates() {
    let mut state = loaded();
    state.toggle_group("Proteobacteria");
    let rows = rows(&render(&state, NumberLocale::En));
    let detail = rows[0].detail.as_ref().unwrap();
    assert_eq!(
        detail.ecological_role,
        "Sulfur and nitrogen cycling at the redox boundary"
    );
    assert_eq!(
        detail.members,
        vec!["Thiobacillus", "Sulfurimonas", "Thiobacillus"]
    );
}

#[test]
fn ecological_context_is_copied_verbatim() {
    let fragments = render(&loaded(), NumberLocale::En);
    let Fragment::EcologicalContext(card) = &fragments[3] else {
        panic!("context last");
    };
    assert_eq!(card.habitat, "Brackish meromictic lake");
    assert_eq!(card.depth_range, "0-24 m");
    assert_eq!(card.study_focus, "Community turnover across the chemocline");
}

#[test]
fn empty_group_list_renders_empty_taxa() {
    let mut meta = fixture();
    meta.identified_taxa.major_groups.clear();
    let mut state = ViewState::new();
    state.apply_load(Ok(meta), "fixture", &RecordingSink::new());
    let fragments = render(&state, NumberLocale::En);
    assert_eq!(fragments.len(), 4);
    assert!(rows(&fragments).is_empty());
}

#[test]
fn minimal_example_document() {
    let raw = r#"{
        "study_information": {"title": "T", "bioproject": "PRJ1", "biosample": "SAM1",
            "sra_study": "SRP1", "sra_experiment": "SRX1", "sra_run": "SRR1", "abstract": "a"},
        "sample_information": {"sample_id": "s", "organism": "X", "taxonomy_id": 1,
            "environment": "e", "location": "Y", "sample_type": "t", "target_community": "c"},
        "sequencing_information": {"platform": "P", "total_spots": 12345, "read_length": "150bp",
            "target_gene": "16S", "total_bases": "1.8 Mbp"},
        "identified_taxa": {
            "major_groups": [{"name": "A", "description": "d", "asv_count": 3, "percentage": 50,
                "ecological_role": "r", "common_members": ["m1", "m2"]}],
            "ecological_context": {"habitat": "h", "depth_range": "d",
                "environmental_factors": "f", "study_focus": "s"}},
        "ncbi_links": {"bioproject": "https://p", "biosample": "https://b", "sra_study": "https://s",
            "sra_experiment": "https://e", "sra_run": "https://r", "taxonomy": "https://t"}
    }"#;
    let mut state = ViewState::new();
    state.apply_load(
        Ok(serde_json::from_str(raw).unwrap()),
        "inline",
        &RecordingSink::new(),
    );
    state.toggle_group("A");
    let fragments = render(&state, NumberLocale::En);
    let Fragment::Overview(overview) = &fragments[0] else {
        panic!("overview first");
    };
    assert_eq!(overview.badges[0].text, "X");
    assert_eq!(overview.tiles[2].primary, "12,345 reads");
    let rows = rows(&fragments);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].asv_count, "3");
    assert_eq!(rows[0].share, "50% of ASVs");
    assert_eq!(rows[0].detail.as_ref().unwrap().members, vec!["m1", "m2"]);
}
