//! Controlled vocabulary
//!
//! The term tables of the crop ontology: plants, their diseases and pests,
//! relation types and the descriptive attribute categories. The vocabulary is
//! an injected value object; [`OntologyVocabulary::default`] ships the built-in
//! Burkina Faso crop tables (corn, onion, tomato).
//!
//! Two spellings are in play throughout: lemmas arrive in free form, tables
//! store underscore-joined ASCII keys ("vert_fonce"). [`normalize_key`] maps
//! the former onto the latter.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use leafvault_similarity::{jaro_winkler, normalize};

/// Default fuzzy-match cutoff for [`validate_term`].
pub const DEFAULT_FUZZY_CUTOFF: f32 = 0.6;

/// Normalize a lemma into table-key form: lowercase, diacritics folded,
/// separators unified, then spaces joined with underscores.
pub fn normalize_key(s: &str) -> String {
    normalize(s).replace(' ', "_")
}

/// Validate a free-form term against a candidate table.
///
/// Exact key match first, then substring containment in table order, then a
/// Jaro-Winkler fuzzy pass under `cutoff`. Returns the canonical table entry,
/// not the input.
pub fn validate_term<'a>(term: &str, candidates: &'a [String], cutoff: f32) -> Option<&'a str> {
    let key = normalize_key(term);
    if key.is_empty() {
        return None;
    }

    for candidate in candidates {
        if *candidate == key {
            return Some(candidate);
        }
    }

    // Substring containment: first table entry wins, so table order is part
    // of the contract ("necrose_severe" resolves to "necrose").
    for candidate in candidates {
        if key.contains(candidate.as_str()) || candidate.contains(&key) {
            return Some(candidate);
        }
    }

    let mut best: Option<&str> = None;
    let mut best_score = 0.0f32;
    for candidate in candidates {
        let score = jaro_winkler(&key, candidate);
        if score > best_score {
            best = Some(candidate);
            best_score = score;
        }
    }
    if best_score >= cutoff {
        best
    } else {
        None
    }
}

/// Descriptive attribute category of a satellite term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatelliteCategory {
    Symptom,
    LeafState,
    Color,
    Shape,
    Texture,
    Venation,
    HealthState,
    Disease,
    Pest,
}

impl SatelliteCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SatelliteCategory::Symptom => "symptom",
            SatelliteCategory::LeafState => "leaf_state",
            SatelliteCategory::Color => "color",
            SatelliteCategory::Shape => "shape",
            SatelliteCategory::Texture => "texture",
            SatelliteCategory::Venation => "venation",
            SatelliteCategory::HealthState => "health_state",
            SatelliteCategory::Disease => "disease",
            SatelliteCategory::Pest => "pest",
        }
    }
}

impl std::fmt::Display for SatelliteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The controlled crop vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyVocabulary {
    plants: Vec<String>,
    plant_aliases: AHashMap<String, String>,
    diseases_by_plant: AHashMap<String, Vec<String>>,
    pests_by_plant: AHashMap<String, Vec<String>>,
    relations: Vec<String>,
    health_states: Vec<String>,
    symptoms: Vec<String>,
    leaf_states_healthy: Vec<String>,
    leaf_states_diseased: Vec<String>,
    colors_healthy: Vec<String>,
    colors_diseased: Vec<String>,
    colors_basic: Vec<String>,
    shapes: Vec<String>,
    textures: Vec<String>,
    venation: Vec<String>,
}

fn terms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn dedup_concat(lists: &[&[String]]) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for term in *list {
            if seen.insert(term.clone()) {
                out.push(term.clone());
            }
        }
    }
    out
}

impl Default for OntologyVocabulary {
    fn default() -> Self {
        let mut plant_aliases = AHashMap::new();
        plant_aliases.insert("mais".to_string(), "corn".to_string());
        plant_aliases.insert("oignon".to_string(), "onion".to_string());
        plant_aliases.insert("tomate".to_string(), "tomato".to_string());

        let mut diseases_by_plant = AHashMap::new();
        diseases_by_plant.insert(
            "corn".to_string(),
            terms(&[
                "fusariose",
                "helminthosporiose",
                "rouille",
                "curvulariose",
                "striure",
                "virose",
                "stress_abiotique",
            ]),
        );
        diseases_by_plant.insert(
            "onion".to_string(),
            terms(&[
                "alternariose",
                "mildiou",
                "pourriture_blanche",
                "fusariose",
                "bacteriose",
                "stress_abiotique",
            ]),
        );
        diseases_by_plant.insert(
            "tomato".to_string(),
            terms(&[
                "alternariose",
                "mildiou",
                "fusariose",
                "bacterial_wilt",
                "virus_tylcv",
                "fletrissement_bacterien",
                "stress_abiotique",
            ]),
        );

        let mut pests_by_plant = AHashMap::new();
        pests_by_plant.insert(
            "corn".to_string(),
            terms(&["foreur_tige", "chenille_legionnaire", "puceron", "cicadelle"]),
        );
        pests_by_plant.insert(
            "onion".to_string(),
            terms(&["thrips", "mouche_oignon", "chenille", "nematode"]),
        );
        pests_by_plant.insert(
            "tomato".to_string(),
            terms(&[
                "aleurode", "acarien", "mineuse", "noctuelle", "thrips", "puceron", "nematode",
            ]),
        );

        Self {
            plants: terms(&["corn", "onion", "tomato", "mais", "oignon", "tomate"]),
            plant_aliases,
            diseases_by_plant,
            pests_by_plant,
            relations: terms(&[
                "has_disease",
                "has_infestation",
                "has_health_status",
                "a_maladie",
                "a_infestation",
                "a_etat_sante",
            ]),
            health_states: terms(&["sain", "saine", "malade", "stresse", "infeste", "vigoureux"]),
            symptoms: terms(&[
                "chlorose",
                "necrose",
                "fletrissement",
                "tache",
                "lesion",
                "pourriture",
                "deformation",
                "mosaique",
                "galerie",
                "perforation",
                "miellat",
                "striure",
                "galle",
                "nanisme",
                "toile",
                "morsure",
                "jaunissement",
            ]),
            leaf_states_healthy: terms(&["saine", "turgescente", "dressee", "jeune", "mature"]),
            leaf_states_diseased: terms(&[
                "malade",
                "fletrie",
                "seche",
                "tachetee",
                "chlorotique",
                "necrotique",
                "perforee",
                "enroulee",
                "cassante",
                "mourante",
                "morte",
                "brulee",
                "decoloree",
                "rougie",
                "tordue",
                "froissee",
                "tombante",
                "aplatie",
                "ratatinee",
                "dechiree",
                "striee",
                "marbree",
                "poudreuse",
                "collante",
                "fumagine",
                "entoilee",
                "minee",
                "senescente",
            ]),
            colors_healthy: terms(&["vert_fonce", "vert_clair", "vert_bleuatre", "vert_moyen"]),
            colors_diseased: terms(&["vert_jaunatre", "jaune", "brun", "vert_grisatre"]),
            colors_basic: terms(&["vert", "rouge", "orange", "noir", "blanc"]),
            shapes: terms(&[
                "lineaire_lanceolee",
                "tubulaire_cylindrique",
                "composee_imparipennee",
                "simple",
                "composee",
                "simple_tubulaire",
                "ovale",
                "lanceolee",
            ]),
            textures: terms(&[
                "lisse",
                "rugueuse",
                "cireuse",
                "creuse",
                "pubescente",
                "glanduleuse",
                "lisse_cireuse",
                "legerement_rugueuse",
            ]),
            venation: terms(&[
                "nervation_parallele",
                "nervation_reticulee",
                "parallele",
                "reticulee",
            ]),
        }
    }
}

impl OntologyVocabulary {
    pub fn plants(&self) -> &[String] {
        &self.plants
    }

    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    pub fn health_states(&self) -> &[String] {
        &self.health_states
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn shapes(&self) -> &[String] {
        &self.shapes
    }

    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    pub fn venation(&self) -> &[String] {
        &self.venation
    }

    /// Diseases of one plant, or every known disease when the plant is
    /// unknown.
    pub fn diseases(&self, plant: Option<&str>) -> Vec<String> {
        self.problem_terms(&self.diseases_by_plant, plant)
    }

    /// Pests of one plant, or every known pest when the plant is unknown.
    pub fn pests(&self, plant: Option<&str>) -> Vec<String> {
        self.problem_terms(&self.pests_by_plant, plant)
    }

    fn problem_terms(
        &self,
        by_plant: &AHashMap<String, Vec<String>>,
        plant: Option<&str>,
    ) -> Vec<String> {
        if let Some(plant) = plant {
            let canonical = self
                .plant_aliases
                .get(plant)
                .map(String::as_str)
                .unwrap_or(plant);
            if let Some(list) = by_plant.get(canonical) {
                return list.clone();
            }
        }
        // Fixed plant order keeps the union deterministic
        let mut lists: Vec<&[String]> = Vec::new();
        for plant in &self.plants {
            if let Some(list) = by_plant.get(plant.as_str()) {
                lists.push(list);
            }
        }
        dedup_concat(&lists)
    }

    /// Leaf states, healthy and diseased together.
    pub fn leaf_states(&self) -> Vec<String> {
        dedup_concat(&[&self.leaf_states_healthy, &self.leaf_states_diseased])
    }

    /// All color terms.
    pub fn colors(&self) -> Vec<String> {
        dedup_concat(&[&self.colors_healthy, &self.colors_diseased, &self.colors_basic])
    }

    /// Every entity term: plants, diseases and pests.
    pub fn hub_terms(&self) -> Vec<String> {
        dedup_concat(&[&self.plants, &self.diseases(None), &self.pests(None)])
    }

    /// Every descriptive attribute term.
    pub fn satellite_terms(&self) -> Vec<String> {
        dedup_concat(&[
            &self.health_states,
            &self.symptoms,
            &self.leaf_states(),
            &self.colors(),
            &self.shapes,
            &self.textures,
            &self.venation,
        ])
    }

    /// Resolve a lemma to a canonical plant name. The alias table runs first,
    /// so localized names map before any fuzzy matching.
    pub fn identify_plant(&self, lemma: &str) -> Option<&str> {
        let key = normalize_key(lemma);
        if let Some(canonical) = self.plant_aliases.get(&key) {
            return Some(canonical);
        }
        validate_term(lemma, &self.plants, DEFAULT_FUZZY_CUTOFF)
    }

    /// Resolve a lemma to a canonical relation type.
    pub fn identify_relation(&self, lemma: &str) -> Option<&str> {
        validate_term(lemma, &self.relations, DEFAULT_FUZZY_CUTOFF)
    }

    /// Classify a lemma into an attribute category with validation.
    ///
    /// Categories are tried in a fixed priority order, health states first.
    /// Disease and pest tables narrow to `plant_context` when given.
    pub fn classify_satellite(
        &self,
        lemma: &str,
        plant_context: Option<&str>,
    ) -> Option<(String, SatelliteCategory)> {
        let diseases = self.diseases(plant_context);
        let pests = self.pests(plant_context);
        let leaf_states = self.leaf_states();
        let colors = self.colors();

        let passes: [(&[String], SatelliteCategory); 9] = [
            (&self.health_states, SatelliteCategory::HealthState),
            (&diseases, SatelliteCategory::Disease),
            (&pests, SatelliteCategory::Pest),
            (&self.symptoms, SatelliteCategory::Symptom),
            (&leaf_states, SatelliteCategory::LeafState),
            (&colors, SatelliteCategory::Color),
            (&self.shapes, SatelliteCategory::Shape),
            (&self.textures, SatelliteCategory::Texture),
            (&self.venation, SatelliteCategory::Venation),
        ];
        for (table, category) in passes {
            if let Some(validated) = validate_term(lemma, table, DEFAULT_FUZZY_CUTOFF) {
                return Some((validated.to_string(), category));
            }
        }
        None
    }

    /// Exact-membership attribute category of a canonical satellite term.
    ///
    /// Unlike [`classify_satellite`] this does no fuzzy matching and puts
    /// health states last, so a term present in both leaf-state and
    /// health-state tables ("saine") keeps the more specific category.
    pub fn satellite_category_of(&self, term: &str) -> Option<SatelliteCategory> {
        let key = normalize_key(term);
        let leaf_states = self.leaf_states();
        let colors = self.colors();

        let passes: [(&[String], SatelliteCategory); 7] = [
            (&self.symptoms, SatelliteCategory::Symptom),
            (&leaf_states, SatelliteCategory::LeafState),
            (&colors, SatelliteCategory::Color),
            (&self.shapes, SatelliteCategory::Shape),
            (&self.textures, SatelliteCategory::Texture),
            (&self.venation, SatelliteCategory::Venation),
            (&self.health_states, SatelliteCategory::HealthState),
        ];
        for (table, category) in passes {
            if table.iter().any(|t| *t == key) {
                return Some(category);
            }
        }
        None
    }

    /// Accept auxiliary relation lemmas from an external ontology. Only
    /// `has_*`-patterned lemmas are kept; everything else is ignored.
    pub fn extend_relations<I, S>(&mut self, lemmas: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for lemma in lemmas {
            let key = normalize_key(lemma.as_ref());
            if key.contains("has_") && !self.relations.contains(&key) {
                self.relations.push(key);
            }
        }
    }
}
