#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use patient_ingest::ccda::{parse_document, parse_patient_record};
    use patient_ingest::{Gender, IngestError, parse_patient_xml};

    use crate::utils::fixtures::{DocumentBuilder, sample_document};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_demographics() {
        let record = parse_patient_xml(&sample_document("PAT-1001")).unwrap();
        let d = record.demographics();

        // The document's own id must not be mistaken for the patient's
        assert_eq!(d.patient_id, "PAT-1001");
        assert_eq!(d.first_name.as_deref(), Some("Jane Quinn"));
        assert_eq!(d.last_name.as_deref(), Some("Doe"));
        assert_eq!(d.full_name().as_deref(), Some("Jane Quinn Doe"));
        assert_eq!(d.birth_date, NaiveDate::from_ymd_opt(1975, 5, 12));
        assert_eq!(d.gender, Gender::Female);
        assert_eq!(d.race.as_deref(), Some("White"));
        assert_eq!(d.ethnicity.as_deref(), Some("Not Hispanic or Latino"));
        assert_eq!(d.marital_status.as_deref(), Some("Married"));
        assert_eq!(d.street.as_deref(), Some("42 Harbor Road"));
        assert_eq!(d.city.as_deref(), Some("Portland"));
        assert_eq!(d.state.as_deref(), Some("OR"));
        assert_eq!(d.postal_code.as_deref(), Some("97201"));
        assert_eq!(d.language.as_deref(), Some("en, es"));
    }

    #[test]
    fn test_telecoms() {
        let record = parse_patient_xml(&sample_document("PAT-1001")).unwrap();
        let d = record.demographics();

        assert_eq!(d.home_phone.as_deref(), Some("+1(555)555-2003"));
        assert_eq!(d.mobile_phone.as_deref(), Some("+1(555)555-7788"));
        assert_eq!(d.email.as_deref(), Some("jane.doe@example.org"));
    }

    #[test]
    fn test_hospitalization() {
        let record = parse_patient_xml(&sample_document("PAT-1001")).unwrap();
        let stays = record.hospitalizations();

        assert_eq!(stays.len(), 1);
        let stay = &stays[0];
        assert_eq!(stay.patient_id, "PAT-1001");
        assert_eq!(stay.hospitalization_id, "ENC-1");
        // -0500 offsets are normalized to UTC
        assert_eq!(stay.admission_date, Some(ts("2023-01-02 13:30:00")));
        assert_eq!(stay.discharge_date, Some(ts("2023-01-05 17:00:00")));
        assert_eq!(stay.hospital_name.as_deref(), Some("Mercy General Hospital"));
        assert_eq!(stay.service_details.as_deref(), Some("Hospital admission"));
    }

    #[test]
    fn test_diagnosis() {
        let record = parse_patient_xml(&sample_document("PAT-1001")).unwrap();
        let diagnoses = record.diagnoses();

        assert_eq!(diagnoses.len(), 1);
        let diagnosis = &diagnoses[0];
        assert_eq!(diagnosis.patient_id, "PAT-1001");
        assert_eq!(diagnosis.description, "Essential hypertension");
        assert_eq!(diagnosis.diagnosis_date, "2020-01-15 09:30:00");
        assert_eq!(diagnosis.icd10_code.as_deref(), Some("I10"));
        assert_eq!(diagnosis.severity.as_deref(), Some("Moderate"));
    }

    #[test]
    fn test_medication() {
        let record = parse_patient_xml(&sample_document("PAT-1001")).unwrap();
        let medications = record.medications();

        assert_eq!(medications.len(), 1);
        let medication = &medications[0];
        assert_eq!(medication.patient_id, "PAT-1001");
        assert_eq!(medication.medication_code.as_deref(), Some("197361"));
        assert_eq!(medication.medication_name, "Amlodipine 5 MG Oral Tablet");
        assert_eq!(medication.dosage.as_deref(), Some("5 mg"));
        assert_eq!(medication.frequency.as_deref(), Some("1 /d"));
        assert_eq!(medication.start_date, Some(ts("2023-01-02 00:00:00")));
        assert_eq!(medication.end_date, Some(ts("2023-03-01 00:00:00")));
        assert_eq!(medication.instructions, "Take once daily");
    }

    #[test]
    fn test_every_encounter_with_an_id_is_kept() {
        let xml = DocumentBuilder::new("PAT-7")
            .encounter("ENC-1")
            .encounter("ENC-2")
            .encounter("")
            .encounter("ENC-3")
            .build();
        let record = parse_patient_xml(&xml).unwrap();

        let ids: Vec<&str> = record
            .hospitalizations()
            .iter()
            .map(|h| h.hospitalization_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ENC-1", "ENC-2", "ENC-3"]);
        assert!(record.hospitalizations().iter().all(|h| h.patient_id == "PAT-7"));
    }

    #[test]
    fn test_repeated_encounter_is_kept_once() {
        let xml = DocumentBuilder::new("PAT-7")
            .encounter("ENC-7")
            .encounter("ENC-8")
            .encounter("ENC-7")
            .build();
        let record = parse_patient_xml(&xml).unwrap();

        let ids: Vec<&str> = record
            .hospitalizations()
            .iter()
            .map(|h| h.hospitalization_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ENC-7", "ENC-8"]);
        assert_eq!(record.row_counts().hospitalizations, 2);
    }

    #[test]
    fn test_problem_rows_without_date_are_skipped() {
        let xml = DocumentBuilder::new("PAT-8")
            .problem("Asthma", "unknown", "J45.909")
            .problem("Type 2 diabetes", "03/02/2018", "E11.9")
            .build();
        let record = parse_patient_xml(&xml).unwrap();

        let diagnoses = record.diagnoses();
        assert_eq!(diagnoses.len(), 1);
        assert_eq!(diagnoses[0].description, "Type 2 diabetes");
        assert_eq!(diagnoses[0].diagnosis_date, "2018-03-02 00:00:00");
        assert_eq!(diagnoses[0].icd10_code.as_deref(), Some("E11.9"));
    }

    #[test]
    fn test_empty_sections() {
        let record = parse_patient_xml(&DocumentBuilder::new("PAT-9").build()).unwrap();

        assert_eq!(record.patient_id(), "PAT-9");
        assert!(record.hospitalizations().is_empty());
        assert!(record.diagnoses().is_empty());
        assert!(record.medications().is_empty());
        assert_eq!(record.row_counts().total(), 1);
    }

    #[test]
    fn test_medication_defaults() {
        let xml = sample_document("PAT-1")
            .replace(r#" displayName="Amlodipine 5 MG Oral Tablet""#, "")
            .replace("<text>TAKE ONCE DAILY</text>", "");
        let record = parse_patient_xml(&xml).unwrap();

        let medication = &record.medications()[0];
        assert_eq!(medication.medication_name, "Unknown");
        assert_eq!(medication.instructions, "No specific instructions");
    }

    #[test]
    fn test_gender_falls_back_to_translation() {
        let xml = sample_document("PAT-1").replace(
            r#"<administrativeGenderCode code="F" codeSystem="2.16.840.1.113883.5.1" displayName="Female"/>"#,
            r#"<administrativeGenderCode nullFlavor="OTH"><translation code="M" displayName="Male"/></administrativeGenderCode>"#,
        );
        let record = parse_patient_xml(&xml).unwrap();
        assert_eq!(record.demographics().gender, Gender::Male);
    }

    #[test]
    fn test_missing_patient_identifier() {
        let xml = sample_document("PAT-1").replace(r#" extension="PAT-1""#, "");
        let err = parse_patient_xml(&xml).unwrap_err();
        assert!(matches!(err, IngestError::MissingPatient));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_document_without_record_target() {
        let document = parse_document(
            r#"<ClinicalDocument xmlns="urn:hl7-org:v3"><id extension="DOC-1"/></ClinicalDocument>"#,
        )
        .unwrap();
        assert!(matches!(
            parse_patient_record(&document),
            Err(IngestError::MissingPatient)
        ));
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let xml = sample_document("PAT-1");
        let truncated = &xml[..xml.len() / 2];
        let err = parse_patient_xml(truncated).unwrap_err();
        assert!(!err.is_fatal());
    }
}
