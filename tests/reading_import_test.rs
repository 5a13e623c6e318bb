// ==========================================
// 化验读数导入测试
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod reading_import_test {
    use kiln_optimizer::api::ApiError;
    use kiln_optimizer::config::PlantSettings;
    use std::io::Write;
    use tempfile::Builder;

    use crate::test_helpers::{build_api, create_test_db};

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_import_csv_ingests_all_rows() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());

        let csv = write_csv(
            "timestamp,plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3\n\
             2026-03-01T08:00:00Z,,1452.5,221,44.1,13.9,3.5,2.1\n\
             2026-03-01T09:00:00Z,,1461.0,219,43.8,13.6,3.4,2.0\n\
             2026-03-01T10:00:00Z,plant_b,1440,225,44,14,3.5,2.5\n",
        );

        let count = api.import_readings_csv(csv.path()).unwrap();
        assert_eq!(count, 3);

        let default_plant = api.settings().default_plant_id.clone();
        let history = api.history(&default_plant).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kiln_temperature, 1461.0);
        assert!(history[0].lsf > 0.0);
        assert!(history[0].bogue.c3s >= 0.0);
        assert_eq!(api.history("plant_b").unwrap().len(), 1);
    }

    #[test]
    fn test_import_bad_row_writes_nothing() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());

        let csv = write_csv(
            "plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3\n\
             plant_a,1450,220,44,14,3.5,2.5\n\
             plant_a,hot,220,44,14,3.5,2.5\n",
        );

        let err = api.import_readings_csv(csv.path()).unwrap_err();
        assert!(matches!(err, ApiError::ImportError(_)));
        assert!(api.history("plant_a").unwrap().is_empty());
    }

    #[test]
    fn test_import_nan_kiln_after_valid_rows_writes_nothing() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());

        let csv = write_csv(
            "plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3\n\
             plant_a,1450,220,44,14,3.5,2.5\n\
             plant_a,1451,220,44,14,3.5,2.5\n\
             plant_a,NaN,220,44,14,3.5,2.5\n",
        );

        let err = api.import_readings_csv(csv.path()).unwrap_err();
        assert!(matches!(err, ApiError::ImportError(_)));
        assert!(api.history("plant_a").unwrap().is_empty());
    }

    #[test]
    fn test_import_oxide_above_hundred_is_clamped() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());

        let csv = write_csv("plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3\nplant_a,1450,220,150,14,3.5,2.5\n");

        api.import_readings_csv(csv.path()).unwrap();
        let s = &api.history("plant_a").unwrap()[0];
        assert_eq!(s.composition.cao, 100.0);
        assert!(s.lsf < 334.0);
    }

    #[test]
    fn test_import_negative_oxide_is_degraded() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());

        let csv = write_csv("plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3\nplant_a,1450,220,44,-14,3.5,2.5\n");

        api.import_readings_csv(csv.path()).unwrap();
        let s = &api.history("plant_a").unwrap()[0];
        assert_eq!(s.composition.sio2, 0.0);
        assert!(s.lsf.is_finite());
    }

    #[test]
    fn test_import_rejects_non_csv() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let api = build_api(&db_path, PlantSettings::default());
        let file = Builder::new().suffix(".xlsx").tempfile().unwrap();

        assert!(matches!(
            api.import_readings_csv(file.path()),
            Err(ApiError::ImportError(_))
        ));
    }
}
