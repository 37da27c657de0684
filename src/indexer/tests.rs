//! Indexer Module Tests
//!
//! ## Test Scopes
//! - **Query documents**: JSON shape per match type.
//! - **Query indexer**: rebuild sequence, stored counts, synonym sources, failure modes.
//! - **Taxon indexer**: field treatments, bulk loading, criteria queries and lookups.

#[cfg(test)]
mod tests {
    use crate::analysis::expander::{AUTOPHRASE_DUMP_FILE, SYNONYMS_DUMP_FILE};
    use crate::backend::client::SearchBackend;
    use crate::backend::memory::InMemoryBackend;
    use crate::backend::mock::RecordingBackend;
    use crate::error::PercolatorError;
    use crate::indexer::query::{PercolatorIndexer, QueryIndexing, COUNTRY_INDEX, SPECIES_INDEX};
    use crate::indexer::taxon::{field_key, SpeciesTaxonIndexer, TaxonIndexing, SPECIES_TAXA_INDEX};
    use crate::indexer::types::{
        IndexSources, MatchType, QueryDocument, TaxonCriteria, TaxonFieldConfig,
    };
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn write_source(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    // ============================================================
    // QUERY DOCUMENTS
    // ============================================================

    #[test]
    fn test_query_document_json() {
        let doc = QueryDocument {
            term: "capricornis thar".to_string(),
            match_type: MatchType::MatchPhrase,
            field_name: "content".to_string(),
        };

        assert_eq!(
            doc.to_json(),
            json!({ "query": { "match_phrase": { "content": "capricornis thar" } } })
        );
    }

    #[test]
    fn test_match_type_names() {
        assert_eq!(MatchType::Match.as_str(), "match");
        assert_eq!(MatchType::MatchPhrase.as_str(), "match_phrase");
        assert_eq!(serde_json::to_value(MatchType::MatchPhrase).unwrap(), "match_phrase");
    }

    // ============================================================
    // QUERY INDEXER
    // ============================================================

    #[tokio::test]
    async fn test_species_rebuild_sequence() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::species(backend.clone());
        let vocabulary = write_source("Capricornis thar\nPanthera leo\ncapricornis thar\n");

        let stored = indexer
            .index_queries(&IndexSources::vocabulary(vocabulary.path()))
            .await
            .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(
            backend.ops(),
            vec!["delete_index", "create_index", "put_document", "put_document", "refresh"]
        );
        assert!(backend.calls().iter().all(|c| c.index == SPECIES_INDEX));

        let create = &backend.calls()[1].body;
        let syn = &create["settings"]["analysis"]["filter"]["species_syn"]["synonyms"];
        assert_eq!(syn, &json!(["c_thar, capricornis_thar", "p_leo, panthera_leo"]));

        let stored_terms: Vec<String> = backend
            .calls()
            .iter()
            .filter(|c| c.op == "put_document")
            .map(|c| c.body["query"]["match_phrase"]["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(stored_terms, vec!["capricornis thar", "panthera leo"]);
    }

    #[tokio::test]
    async fn test_country_rebuild_merges_synonyms() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::countries(backend.clone());
        let countries = write_source("United States\nFrance\n");
        let synonyms = write_source("United States, US, USA\n");

        let stored = indexer
            .index_queries(&IndexSources::vocabulary(countries.path()).with_synonyms(synonyms.path()))
            .await
            .unwrap();

        assert_eq!(stored, 2);
        let create = &backend.calls()[1];
        assert_eq!(create.index, COUNTRY_INDEX);
        assert_eq!(
            create.body["settings"]["analysis"]["filter"]["country_syn"]["synonyms"],
            json!(["united_states, us, usa"])
        );
        assert_eq!(
            create.body["settings"]["analysis"]["analyzer"]["country_analyzer"]["tokenizer"],
            "lowercase"
        );
    }

    #[tokio::test]
    async fn test_rebuild_dumps_rule_files() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::countries(backend.clone());
        let countries = write_source("United Kingdom\n");
        let synonyms = write_source("united kingdom, great britain, uk\n");
        let dir = tempfile::tempdir().unwrap();

        indexer
            .index_queries(
                &IndexSources::vocabulary(countries.path())
                    .with_synonyms(synonyms.path())
                    .with_dump_dir(dir.path()),
            )
            .await
            .unwrap();

        let autophrase = std::fs::read_to_string(dir.path().join(AUTOPHRASE_DUMP_FILE)).unwrap();
        let groups = std::fs::read_to_string(dir.path().join(SYNONYMS_DUMP_FILE)).unwrap();
        assert_eq!(
            autophrase,
            "great britain => great_britain\nunited kingdom => united_kingdom\n"
        );
        assert_eq!(groups, "great_britain, uk, united_kingdom\n");
    }

    #[tokio::test]
    async fn test_unwritable_dump_dir_touches_nothing() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::species(backend.clone());
        let vocabulary = write_source("Panthera leo\n");
        let dir = tempfile::tempdir().unwrap();

        let result = indexer
            .index_queries(
                &IndexSources::vocabulary(vocabulary.path()).with_dump_dir(dir.path().join("missing")),
            )
            .await;

        assert!(matches!(result, Err(PercolatorError::OutputWrite { .. })));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_country_rebuild_requires_synonyms() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::countries(backend.clone());
        let countries = write_source("France\n");

        let result = indexer
            .index_queries(&IndexSources::vocabulary(countries.path()))
            .await;

        assert!(matches!(result, Err(PercolatorError::InvalidParameter { .. })));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_vocabulary_touches_nothing() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = PercolatorIndexer::species(backend.clone());

        let result = indexer
            .index_queries(&IndexSources::vocabulary("/nonexistent/species.txt"))
            .await;

        assert!(matches!(result, Err(PercolatorError::SourceRead { .. })));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_stops_rebuild() {
        let backend = Arc::new(RecordingBackend::new());
        backend.fail_on("create_index");
        let indexer = PercolatorIndexer::species(backend.clone());
        let vocabulary = write_source("panthera leo\n");

        let result = indexer
            .index_queries(&IndexSources::vocabulary(vocabulary.path()))
            .await;

        assert!(matches!(result, Err(PercolatorError::BackendUnavailable(_))));
        assert_eq!(backend.ops(), vec!["delete_index", "create_index"]);
    }

    #[tokio::test]
    async fn test_rebuild_is_repeatable() {
        let backend = Arc::new(InMemoryBackend::new());
        let indexer = PercolatorIndexer::species(backend.clone());
        let vocabulary = write_source("panthera leo\ncapricornis thar\n");
        let sources = IndexSources::vocabulary(vocabulary.path());

        indexer.index_queries(&sources).await.unwrap();
        indexer.index_queries(&sources).await.unwrap();

        assert_eq!(indexer.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_reads_configured_index() {
        let backend = Arc::new(RecordingBackend::with_count(42));
        let indexer = PercolatorIndexer::species(backend.clone());

        assert_eq!(indexer.count().await.unwrap(), 42);
        assert_eq!(backend.calls()[0].index, SPECIES_INDEX);
    }

    // ============================================================
    // TAXON INDEXER
    // ============================================================

    const TAXA: &str = "Kingdom;Genus;Scientific Name;Author\n\
                        Animalia;Capricornis;Capricornis thar;Hodgson, 1831\n\
                        Animalia;Panthera;Panthera leo;Linnaeus, 1758\n";

    #[test]
    fn test_field_key() {
        assert_eq!(field_key("Scientific Name"), "scientific_name");
        assert_eq!(field_key(" Genus "), "genus");
    }

    #[test]
    fn test_treatments() {
        let indexer = SpeciesTaxonIndexer::new(Arc::new(RecordingBackend::new()));

        assert_eq!(indexer.treat("scientific_name", " Capricornis  Thar "), "capricornis_thar");
        assert_eq!(indexer.treat("genus", "Capricornis"), "capricornis");
        assert_eq!(indexer.treat("author", " Hodgson, 1831 "), "Hodgson, 1831");
    }

    #[tokio::test]
    async fn test_index_taxa_bulk_loads_treated_rows() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = SpeciesTaxonIndexer::new(backend.clone());
        let taxa = write_source(TAXA);

        let stored = indexer.index_taxa(taxa.path()).await.unwrap();

        assert_eq!(stored, 2);
        assert_eq!(
            backend.ops(),
            vec!["delete_index", "create_index", "bulk_insert", "refresh"]
        );
        let bulk = &backend.calls()[2];
        assert_eq!(bulk.index, SPECIES_TAXA_INDEX);
        assert_eq!(
            bulk.body[0],
            json!({
                "kingdom": "animalia",
                "genus": "capricornis",
                "scientific_name": "capricornis_thar",
                "author": "Hodgson, 1831"
            })
        );
    }

    #[tokio::test]
    async fn test_index_taxa_missing_source() {
        let backend = Arc::new(RecordingBackend::new());
        let indexer = SpeciesTaxonIndexer::new(backend.clone());

        let result = indexer.index_taxa(std::path::Path::new("/nonexistent/taxa.csv")).await;

        assert!(matches!(result, Err(PercolatorError::SourceRead { .. })));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_criteria_query_applies_treatments() {
        let indexer = SpeciesTaxonIndexer::new(Arc::new(RecordingBackend::new()));
        let mut criteria = TaxonCriteria::new();
        criteria.insert("Scientific Name".to_string(), "Panthera Leo".to_string());

        let body = indexer.criteria_query(&criteria, 1);

        assert_eq!(
            body,
            json!({
                "query": { "bool": { "filter": [ { "term": { "scientific_name": "panthera_leo" } } ] } },
                "size": 1
            })
        );
    }

    #[tokio::test]
    async fn test_search_and_first() {
        let backend = Arc::new(InMemoryBackend::new());
        let indexer = SpeciesTaxonIndexer::with_fields(backend.clone(), TaxonFieldConfig::species());
        let taxa = write_source(TAXA);
        indexer.index_taxa(taxa.path()).await.unwrap();
        assert_eq!(backend.count(SPECIES_TAXA_INDEX).await.unwrap(), 2);

        let recording = Arc::new(RecordingBackend::with_hits(vec![
            crate::backend::protocol::Hit {
                id: Some("1".to_string()),
                score: Some(0.0),
                source: json!({ "genus": "panthera", "scientific_name": "panthera_leo", "year": 1758 }),
            },
        ]));
        let lookup = SpeciesTaxonIndexer::new(recording.clone());
        let mut criteria = TaxonCriteria::new();
        criteria.insert("genus".to_string(), "Panthera".to_string());

        let records = lookup.search(&criteria).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("scientific_name").map(String::as_str), Some("panthera_leo"));
        assert_eq!(records[0].get("year").map(String::as_str), Some("1758"));

        let first = lookup.first(&criteria).await.unwrap();
        assert!(first.is_some());
        assert_eq!(recording.last_search_body().unwrap()["size"], 1);
    }
}
