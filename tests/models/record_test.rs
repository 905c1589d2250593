#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use patient_ingest::{Demographics, Diagnosis, Hospitalization, PatientRecord, RowCounts};

    fn stay(id: &str, admitted: &str, discharged: Option<&str>) -> Hospitalization {
        let ts = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Hospitalization {
            patient_id: String::new(),
            hospitalization_id: id.to_string(),
            admission_date: Some(ts(admitted)),
            discharge_date: discharged.map(ts),
            hospital_name: Some("St. Olav".to_string()),
            service_details: None,
        }
    }

    #[test]
    fn test_full_name() {
        let mut demographics = Demographics::new("p-1");
        assert_eq!(demographics.full_name(), None);

        demographics.last_name = Some("Hansen".to_string());
        assert_eq!(demographics.full_name().as_deref(), Some("Hansen"));

        demographics.first_name = Some("Kari Anne".to_string());
        assert_eq!(demographics.full_name().as_deref(), Some("Kari Anne Hansen"));
    }

    #[test]
    fn test_pushed_records_belong_to_patient() {
        let mut record = PatientRecord::new(
            Demographics::new("p-9"),
            vec![stay("E1", "2023-01-02 08:00:00", None)],
            vec![],
            vec![],
        );
        record.push_hospitalization(stay("E2", "2023-02-02 08:00:00", None));
        record.push_diagnosis(Diagnosis {
            patient_id: "p-other".to_string(),
            diagnosis_date: "2023-02-02 00:00:00".to_string(),
            icd10_code: Some("J45.909".to_string()),
            description: "Asthma".to_string(),
            severity: None,
        });

        assert!(record.hospitalizations().iter().all(|h| h.patient_id == "p-9"));
        assert_eq!(record.diagnoses()[0].patient_id, "p-9");
        assert_eq!(
            record.row_counts(),
            RowCounts {
                demographics: 1,
                hospitalizations: 2,
                diagnoses: 1,
                medications: 0,
            }
        );
        assert_eq!(record.row_counts().total(), 4);
    }

    #[test]
    fn test_record_serializes_for_reports() {
        let record = PatientRecord::new(Demographics::new("p-3"), vec![], vec![], vec![]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["demographics"]["patient_id"], "p-3");
        assert_eq!(json["demographics"]["gender"], "Unknown");
        assert!(json["medications"].as_array().unwrap().is_empty());
    }
}
