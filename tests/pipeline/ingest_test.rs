#[cfg(test)]
mod tests {
    use patient_ingest::store::TABLES;
    use patient_ingest::{IngestError, IngestWorker, RowCounts};

    use crate::utils::fixtures::{DocumentBuilder, TestEnv, sample_document};

    #[tokio::test]
    async fn test_single_document_fills_every_table() {
        let env = TestEnv::new();
        let store = env.store().await;
        env.drop_document("patient-1001.xml", &sample_document("PAT-1001"));

        let worker = IngestWorker::with_store(env.config(), store.clone());
        let report = worker.run().await.unwrap();

        assert_eq!(report.processed.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.processed[0].patient_id, "PAT-1001");
        for table in TABLES {
            assert_eq!(store.count_rows(table, "PAT-1001").await.unwrap(), 1, "{table}");
            assert_eq!(store.total_rows(table).await.unwrap(), 1, "{table}");
        }

        assert!(TestEnv::files_in(&env.incoming).is_empty());
        assert_eq!(TestEnv::files_in(&env.processed), vec!["patient-1001.xml"]);
        assert_eq!(
            report.processed[0].archived_to.as_deref(),
            Some(env.processed.join("patient-1001.xml").as_path())
        );
    }

    #[tokio::test]
    async fn test_every_encounter_becomes_a_hospitalization() {
        let env = TestEnv::new();
        let store = env.store().await;
        let xml = DocumentBuilder::new("PAT-2")
            .encounter("ENC-10")
            .encounter("ENC-11")
            .encounter("ENC-12")
            .problem("Asthma", "2/1/2019 8:00:00 AM", "J45.909")
            .problem("Type 2 diabetes", "03/02/2018", "E11.9")
            .build();
        env.drop_document("patient-2.xml", &xml);

        let report = IngestWorker::with_store(env.config(), store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(
            report.rows,
            RowCounts {
                demographics: 1,
                hospitalizations: 3,
                diagnoses: 2,
                medications: 0,
            }
        );
        assert_eq!(store.count_rows("patient_hospitalizations", "PAT-2").await.unwrap(), 3);
        assert_eq!(store.count_rows("patient_diagnoses", "PAT-2").await.unwrap(), 2);
        assert_eq!(store.row_counts().await.unwrap(), report.rows);
    }

    #[tokio::test]
    async fn test_repeated_encounter_does_not_reject_document() {
        let env = TestEnv::new();
        let store = env.store().await;
        let xml = DocumentBuilder::new("PAT-7")
            .encounter("ENC-7")
            .encounter("ENC-7")
            .build();
        env.drop_document("patient-7.xml", &xml);

        let report = IngestWorker::with_store(env.config(), store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.processed.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(store.count_rows("patient_demographics", "PAT-7").await.unwrap(), 1);
        assert_eq!(store.count_rows("patient_hospitalizations", "PAT-7").await.unwrap(), 1);
        assert_eq!(TestEnv::files_in(&env.processed), vec!["patient-7.xml"]);
    }

    #[tokio::test]
    async fn test_empty_incoming_directory() {
        let env = TestEnv::new();
        let store = env.store().await;

        let report = IngestWorker::with_store(env.config(), store.clone())
            .run()
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(store.row_counts().await.unwrap(), RowCounts::default());
        assert!(!env.processed.exists());
    }

    #[tokio::test]
    async fn test_malformed_document_is_skipped() {
        let env = TestEnv::new();
        let store = env.store().await;
        env.drop_document("a-good.xml", &sample_document("PAT-1"));
        let bad = env.drop_document("b-broken.xml", "<ClinicalDocument><recordTarget>");
        env.drop_document("c-no-patient.xml", &sample_document("PAT-3").replace(r#" extension="PAT-3""#, ""));
        env.drop_document("notes.txt", "not a document");

        let report = IngestWorker::with_store(env.config(), store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].source, bad);
        assert_eq!(store.total_rows("patient_demographics").await.unwrap(), 1);

        assert_eq!(
            TestEnv::files_in(&env.incoming),
            vec!["b-broken.xml", "c-no-patient.xml", "notes.txt"]
        );
        assert_eq!(TestEnv::files_in(&env.processed), vec!["a-good.xml"]);
    }

    #[tokio::test]
    async fn test_rejected_document_is_rolled_back() {
        let env = TestEnv::new();
        let store = env.store().await;
        // Both documents claim encounter ENC-1; the second violates its key.
        env.drop_document("a.xml", &sample_document("PAT-A"));
        env.drop_document("b.xml", &sample_document("PAT-B"));

        let report = IngestWorker::with_store(env.config(), store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        for table in TABLES {
            assert_eq!(store.count_rows(table, "PAT-A").await.unwrap(), 1, "{table}");
            assert_eq!(store.count_rows(table, "PAT-B").await.unwrap(), 0, "{table}");
        }
        assert_eq!(TestEnv::files_in(&env.incoming), vec!["b.xml"]);
        assert_eq!(TestEnv::files_in(&env.processed), vec!["a.xml"]);
    }

    #[tokio::test]
    async fn test_reingesting_a_patient_replaces_its_rows() {
        let env = TestEnv::new();
        let store = env.store().await;
        let worker = IngestWorker::with_store(env.config(), store.clone());

        env.drop_document("patient.xml", &sample_document("PAT-1"));
        worker.run().await.unwrap();
        env.drop_document("patient.xml", &sample_document("PAT-1"));
        let report = worker.run().await.unwrap();

        assert_eq!(report.processed.len(), 1);
        for table in TABLES {
            assert_eq!(store.total_rows(table).await.unwrap(), 1, "{table}");
        }

        // Both copies are kept; the second one under a new name.
        let archived = TestEnv::files_in(&env.processed);
        assert_eq!(archived.len(), 2);
        assert!(archived.contains(&"patient.xml".to_string()));
        assert!(TestEnv::files_in(&env.incoming).is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let env = TestEnv::new();
        env.drop_document("patient.xml", &sample_document("PAT-1"));

        let worker = IngestWorker::connect(env.config().dry_run()).await.unwrap();
        let report = worker.run().await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].archived_to, None);
        assert_eq!(report.rows.total(), 4);
        assert!(report.summary().starts_with("parsed 1 document(s)"));

        assert_eq!(TestEnv::files_in(&env.incoming), vec!["patient.xml"]);
        assert!(!env.processed.exists());
    }

    #[tokio::test]
    async fn test_missing_incoming_directory_is_fatal() {
        let env = TestEnv::new();
        let store = env.store().await;
        let config = env
            .config()
            .with_directories(&env.incoming.join("absent"), &env.processed);

        let err = IngestWorker::with_store(config, store).run().await.unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_store_without_tables_stops_the_run() {
        let env = TestEnv::new();
        env.drop_document("a.xml", &sample_document("PAT-A"));
        env.drop_document("b.xml", &sample_document("PAT-B"));

        // Connected, but `setup` never ran.
        let worker = IngestWorker::connect(env.config()).await.unwrap();
        let err = worker.run().await.unwrap_err();

        assert!(matches!(err, IngestError::Config(_)));
        assert!(err.is_fatal());
        assert_eq!(TestEnv::files_in(&env.incoming), vec!["a.xml", "b.xml"]);
        assert!(!env.processed.exists());
    }

    #[tokio::test]
    async fn test_lost_database_stops_the_run() {
        let env = TestEnv::new();
        let store = env.store().await;
        env.drop_document("patient.xml", &sample_document("PAT-1"));

        store.close().await;
        let err = IngestWorker::with_store(env.config(), store)
            .run()
            .await
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(TestEnv::files_in(&env.incoming), vec!["patient.xml"]);
        assert!(!env.processed.exists());
    }

    #[tokio::test]
    async fn test_unreachable_database() {
        let env = TestEnv::new();
        let database = env
            .database
            .clone()
            .with_url(format!("sqlite://{}", env.incoming.join("missing/records.db").display()));

        let err = IngestWorker::connect(env.config().with_database(database))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IngestError::Connection(_)));
        assert!(err.is_fatal());
    }
}
