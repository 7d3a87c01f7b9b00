use crate::config::VectorizerConfig;
use crate::core::compare::compare;
use crate::core::features::build_feature_text;
use crate::core::similarity::{cosine_similarity, rank_similar_by};
use crate::core::types::{Comparison, MedicineId, MedicineRecord, RankedMedicine, Recommendation};
use crate::core::vectorizer::{SparseVector, TfidfVectorizer};
use crate::error::{RecommendError, Result};
use crate::persistence::load_medicines;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// An immutable, fitted snapshot of the collection.
///
/// Built once per process; every query borrows from it.
#[derive(Debug)]
pub struct Session {
    medicines: Vec<MedicineRecord>,
    /// Lower-cased name -> first record with that name.
    index: HashMap<String, MedicineId>,
    vectorizer: TfidfVectorizer,
    matrix: Vec<SparseVector>,
}

impl Session {
    /// Builds feature texts for every medicine and fits the vectorizer over
    /// the whole collection.
    pub fn initialize(medicines: Vec<MedicineRecord>, config: &VectorizerConfig) -> Self {
        let mut index = HashMap::with_capacity(medicines.len());
        for (id, med) in medicines.iter().enumerate() {
            if let Some(&first) = index.get(&med.key()) {
                warn!(name = %med.name, first, duplicate = id, "duplicate medicine name; lookups resolve to the first entry");
                continue;
            }
            index.insert(med.key(), id);
        }

        let features: Vec<String> = medicines.iter().map(build_feature_text).collect();

        let mut vectorizer = TfidfVectorizer::from_config(config);
        let matrix = vectorizer.fit_transform(&features);

        for (id, _) in matrix.iter().enumerate().filter(|(_, row)| row.is_zero()) {
            warn!(name = %medicines[id].name, id, "medicine has no usable features; it will never be recommended");
        }

        info!(
            medicines = medicines.len(),
            dimensions = vectorizer.vocabulary_size(),
            "recommendation model fitted"
        );

        Self {
            medicines,
            index,
            vectorizer,
            matrix,
        }
    }

    pub fn medicines(&self) -> &[MedicineRecord] {
        &self.medicines
    }

    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }

    /// Size of the fitted vocabulary.
    pub fn feature_dimensions(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn vector(&self, id: MedicineId) -> Option<&SparseVector> {
        self.matrix.get(id)
    }

    pub fn medicine(&self, id: MedicineId) -> Option<&MedicineRecord> {
        self.medicines.get(id)
    }

    /// Medicines whose fitted vector is all zeros.
    pub fn featureless(&self) -> Vec<MedicineId> {
        self.matrix
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_zero())
            .map(|(id, _)| id)
            .collect()
    }

    /// Case-insensitive exact lookup by name.
    pub fn find(&self, name: &str) -> Result<MedicineId> {
        let key = name.trim().to_lowercase();
        self.index
            .get(&key)
            .copied()
            .ok_or_else(|| RecommendError::NotFound(name.trim().to_string()))
    }

    pub fn similarity(&self, a: MedicineId, b: MedicineId) -> f64 {
        match (self.matrix.get(a), self.matrix.get(b)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb),
            _ => 0.0,
        }
    }

    /// The `top_n` medicines most similar to `name`, best first.
    ///
    /// Records sharing the query's name never appear in the results.
    pub fn recommend(&self, name: &str, top_n: usize) -> Result<Recommendation<'_>> {
        let query_id = self.find(name)?;
        let query = &self.medicines[query_id];
        let key = query.key();
        debug!(query = %query.name, top_n, "ranking candidates");

        let results = rank_similar_by(&self.matrix, query_id, top_n, |id| self.medicines[id].key() == key)
            .into_iter()
            .map(|(id, score)| {
                let medicine = &self.medicines[id];
                RankedMedicine {
                    id,
                    medicine,
                    score,
                    comparison: compare(query, medicine),
                }
            })
            .collect();

        Ok(Recommendation { query, results })
    }

    /// Similarity and attribute overlap of two named medicines.
    pub fn compare(&self, left: &str, right: &str) -> Result<(f64, Comparison)> {
        let a = self.find(left)?;
        let b = self.find(right)?;
        Ok((self.similarity(a, b), compare(&self.medicines[a], &self.medicines[b])))
    }
}

/// Lifecycle of the recommender within one process.
#[derive(Debug)]
pub enum EngineState {
    Unloaded,
    Loaded(Session),
}

pub struct RecommenderEngine {
    config: VectorizerConfig,
    state: EngineState,
}

impl RecommenderEngine {
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            state: EngineState::Unloaded,
        }
    }

    /// Creates an engine and loads it from `path` straight away.
    pub fn from_path(path: impl AsRef<Path>, config: VectorizerConfig) -> Result<Self> {
        let mut engine = Self::new(config);
        engine.load(path)?;
        Ok(engine)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, EngineState::Loaded(_))
    }

    /// Reads the store and moves the engine to `Loaded`.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.is_loaded() {
            return Err(RecommendError::AlreadyLoaded);
        }
        let medicines = load_medicines(path.as_ref())?;
        info!(count = medicines.len(), path = %path.as_ref().display(), "loaded medicines");
        self.load_records(medicines)
    }

    pub fn load_records(&mut self, medicines: Vec<MedicineRecord>) -> Result<()> {
        if self.is_loaded() {
            return Err(RecommendError::AlreadyLoaded);
        }
        self.state = EngineState::Loaded(Session::initialize(medicines, &self.config));
        Ok(())
    }

    pub fn session(&self) -> Result<&Session> {
        match &self.state {
            EngineState::Loaded(session) => Ok(session),
            EngineState::Unloaded => Err(RecommendError::NotInitialized),
        }
    }

    pub fn recommend(&self, name: &str, top_n: usize) -> Result<Recommendation<'_>> {
        self.session()?.recommend(name, top_n)
    }

    pub fn compare(&self, left: &str, right: &str) -> Result<(f64, Comparison)> {
        self.session()?.compare(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> Vec<MedicineRecord> {
        vec![
            MedicineRecord::new("Paracetamol")
                .with_uses(["fever", "pain", "headache", "arthritis"])
                .with_components(["acetaminophen"]),
            MedicineRecord::new("Ibuprofen")
                .with_uses(["pain", "inflammation", "arthritis", "fever"])
                .with_components(["ibuprofen"]),
        ]
    }

    fn loaded(medicines: Vec<MedicineRecord>) -> RecommenderEngine {
        let mut engine = RecommenderEngine::new(VectorizerConfig::default());
        engine.load_records(medicines).unwrap();
        engine
    }

    #[test]
    fn test_query_before_load_is_not_initialized() {
        let engine = RecommenderEngine::new(VectorizerConfig::default());
        assert!(!engine.is_loaded());
        assert!(matches!(engine.recommend("x", 5), Err(RecommendError::NotInitialized)));
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut engine = loaded(collection());
        assert!(matches!(engine.load_records(collection()), Err(RecommendError::AlreadyLoaded)));
    }

    #[test]
    fn test_lowercase_query_finds_ibuprofen() {
        let engine = loaded(collection());
        let rec = engine.recommend("paracetamol", 1).unwrap();
        assert_eq!(rec.query.name, "Paracetamol");
        assert_eq!(rec.results.len(), 1);

        let top = &rec.results[0];
        assert_eq!(top.medicine.name, "Ibuprofen");
        assert!(top.score > 0.0);
        let mut shared = top.comparison.shared_uses.clone();
        shared.sort();
        assert_eq!(shared, vec!["arthritis", "fever", "pain"]);
        assert!(top.comparison.shared_components.is_empty());
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let engine = loaded(collection());
        match engine.recommend("Aspirin", 5) {
            Err(RecommendError::NotFound(name)) => assert_eq!(name, "Aspirin"),
            other => panic!("expected NotFound, got {:?}", other.map(|r| r.results.len())),
        }
    }

    #[test]
    fn test_partial_name_is_not_a_match() {
        let engine = loaded(collection());
        assert!(engine.recommend("para", 5).is_err());
    }

    #[test]
    fn test_result_length_is_capped_by_collection() {
        let mut meds = collection();
        meds.push(MedicineRecord::new("Aspirin").with_uses(["pain", "fever"]).with_components(["acetylsalicylic acid"]));
        meds.push(MedicineRecord::new("Cetirizine").with_uses(["allergy"]).with_components(["cetirizine"]));
        let engine = loaded(meds);
        assert_eq!(engine.recommend("Aspirin", 5).unwrap().results.len(), 3);
    }

    #[test]
    fn test_single_medicine_has_no_recommendations() {
        let engine = loaded(vec![MedicineRecord::new("Lonely").with_uses(["pain"])]);
        assert!(engine.recommend("lonely", 5).unwrap().results.is_empty());
    }

    #[test]
    fn test_empty_medicine_is_ranked_last() {
        let mut meds = collection();
        meds.insert(1, MedicineRecord::new("Placebo"));
        meds.push(MedicineRecord::new("Aspirin").with_uses(["pain"]));
        let engine = loaded(meds);
        let rec = engine.recommend("Paracetamol", 2).unwrap();
        assert!(rec.results.iter().all(|r| r.medicine.name != "Placebo"));
    }

    #[test]
    fn test_all_empty_ties_follow_collection_order() {
        let meds = vec![MedicineRecord::new("A"), MedicineRecord::new("B"), MedicineRecord::new("C")];
        let engine = loaded(meds);
        let names: Vec<_> = engine
            .recommend("c", 5)
            .unwrap()
            .results
            .iter()
            .map(|r| (r.medicine.name.as_str(), r.score))
            .collect();
        assert_eq!(names, vec![("A", 0.0), ("B", 0.0)]);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let mut meds = collection();
        meds.push(MedicineRecord::new("IBUPROFEN").with_uses(["cough"]));
        let engine = loaded(meds);
        assert_eq!(engine.session().unwrap().find("ibuprofen").unwrap(), 1);
    }

    #[test]
    fn test_duplicate_name_never_recommends_itself() {
        let engine = loaded(vec![
            MedicineRecord::new("Ibuprofen").with_uses(["pain", "fever"]).with_components(["ibuprofen"]),
            MedicineRecord::new("Aspirin").with_uses(["pain"]).with_components(["aspirin"]),
            MedicineRecord::new("ibuprofen").with_uses(["pain", "fever"]).with_components(["ibuprofen"]),
        ]);
        let rec = engine.recommend("Ibuprofen", 5).unwrap();
        let names: Vec<_> = rec.results.iter().map(|r| r.medicine.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin"]);
    }

    #[test]
    fn test_featureless_medicines_are_reported() {
        let mut meds = collection();
        meds.push(MedicineRecord::new("Vitamin").with_uses(["c"]));
        meds.push(MedicineRecord::new("Placebo"));
        let engine = loaded(meds);
        let session = engine.session().unwrap();
        assert_eq!(session.featureless(), vec![2, 3]);
        assert!(session.vector(2).unwrap().is_zero());
    }

    #[test]
    fn test_compare_is_symmetric() {
        let engine = loaded(collection());
        let (ab, _) = engine.compare("Paracetamol", "Ibuprofen").unwrap();
        let (ba, _) = engine.compare("Ibuprofen", "Paracetamol").unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }
}
