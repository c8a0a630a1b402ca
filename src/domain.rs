use serde::{Deserialize, Deserializer, Serialize};

/// Study metadata document as served at `/data/study_metadata.json`.
///
/// The structure is decoded once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyMetadata {
    pub study_information: StudyInformation,
    pub sample_information: SampleInformation,
    pub sequencing_information: SequencingInformation,
    pub identified_taxa: IdentifiedTaxa,
    pub ncbi_links: NcbiLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyInformation {
    pub title: String,
    pub bioproject: String,
    pub biosample: String,
    pub sra_study: String,
    pub sra_experiment: String,
    pub sra_run: String,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub submitter: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInformation {
    pub sample_id: String,
    pub organism: String,
    #[serde(deserialize_with = "string_or_number")]
    pub taxonomy_id: String,
    pub environment: String,
    pub location: String,
    pub sample_type: String,
    pub target_community: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencingInformation {
    pub platform: String,
    #[serde(default)]
    pub library_strategy: Option<String>,
    #[serde(default)]
    pub library_source: Option<String>,
    #[serde(default)]
    pub library_layout: Option<String>,
    pub read_length: String,
    pub target_gene: String,
    pub total_spots: u64,
    pub total_bases: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedTaxa {
    pub major_groups: Vec<TaxonGroup>,
    pub ecological_context: EcologicalContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonGroup {
    pub name: String,
    pub description: String,
    pub asv_count: u64,
    /// Share of ASVs in percent, taken verbatim from the source.
    pub percentage: f64,
    pub ecological_role: String,
    pub common_members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcologicalContext {
    pub habitat: String,
    pub depth_range: String,
    pub environmental_factors: String,
    pub study_focus: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NcbiLinks {
    pub bioproject: String,
    pub biosample: String,
    pub sra_study: String,
    pub sra_experiment: String,
    pub sra_run: String,
    pub taxonomy: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

// Taxonomy ids are published both as "408172" and 408172.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(value) => value,
        StringOrNumber::Number(value) => value.to_string(),
    })
}

/// Accession categories shown in the links card, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessionKind {
    BioProject,
    BioSample,
    SraStudy,
    SraExperiment,
    SraRun,
    Taxonomy,
}

impl AccessionKind {
    pub const ALL: [AccessionKind; 6] = [
        AccessionKind::BioProject,
        AccessionKind::BioSample,
        AccessionKind::SraStudy,
        AccessionKind::SraExperiment,
        AccessionKind::SraRun,
        AccessionKind::Taxonomy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AccessionKind::BioProject => "BioProject",
            AccessionKind::BioSample => "BioSample",
            AccessionKind::SraStudy => "SRA Study",
            AccessionKind::SraExperiment => "SRA Experiment",
            AccessionKind::SraRun => "SRA Run",
            AccessionKind::Taxonomy => "Taxonomy",
        }
    }
}

impl StudyMetadata {
    /// Identifier text shown next to an accession label.
    pub fn accession(&self, kind: AccessionKind) -> &str {
        let study = &self.study_information;
        match kind {
            AccessionKind::BioProject => &study.bioproject,
            AccessionKind::BioSample => &study.biosample,
            AccessionKind::SraStudy => &study.sra_study,
            AccessionKind::SraExperiment => &study.sra_experiment,
            AccessionKind::SraRun => &study.sra_run,
            AccessionKind::Taxonomy => &self.sample_information.taxonomy_id,
        }
    }

    pub fn link(&self, kind: AccessionKind) -> &str {
        let links = &self.ncbi_links;
        match kind {
            AccessionKind::BioProject => &links.bioproject,
            AccessionKind::BioSample => &links.biosample,
            AccessionKind::SraStudy => &links.sra_study,
            AccessionKind::SraExperiment => &links.sra_experiment,
            AccessionKind::SraRun => &links.sra_run,
            AccessionKind::Taxonomy => &links.taxonomy,
        }
    }

    pub fn group(&self, name: &str) -> Option<&TaxonGroup> {
        self.identified_taxa
            .major_groups
            .iter()
            .find(|group| group.name == name)
    }
}
