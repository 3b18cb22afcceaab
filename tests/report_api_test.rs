// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试范围:
// 1. 区间汇总: 按客户/类别/日期/磨机
// 2. CSV 导出
// 3. 厂区快照
// ==========================================

mod helpers;
mod test_helpers;

use chrono::Local;

use helpers::api_test_helper::*;
use helpers::test_data_builder::{bucket, coarse, fine};

use mill_ops::domain::types::{DurationBucket, MaintenanceKind, MineralCategory};

/// 准备两次提交: A 类客户 M1+M2，B 类客户 M3
fn seed_two_runs(env: &ApiTestEnv) -> (String, String) {
    env.seed_mills(4, 150);
    let a = env.seed_client("Minera A", MineralCategory::A, 200, 100);
    let b = env.seed_client("Minera B", MineralCategory::B, 100, 100);
    let api = &env.state.allocation_api;

    let sid = api.open_session(Some(hm(8, 0))).unwrap().session.session_id;
    api.select_client(&sid, &a.client_id).unwrap();
    api.apply_command(&sid, bucket(DurationBucket::A100)).unwrap();
    api.apply_command(&sid, coarse("M1", 100)).unwrap();
    api.apply_command(&sid, fine("M2", 50)).unwrap();
    api.submit(&sid, "operador").unwrap();

    api.select_client(&sid, &b.client_id).unwrap();
    api.apply_command(&sid, bucket(DurationBucket::B120)).unwrap();
    api.apply_command(&sid, coarse("M3", 30)).unwrap();
    api.apply_command(&sid, fine("M3", 30)).unwrap();
    api.submit(&sid, "operador").unwrap();

    (a.client_id, b.client_id)
}

#[test]
fn test_milling_report_区间汇总() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let (a, b) = seed_two_runs(&env);
    let today = Local::now().date_naive();

    let report = env
        .state
        .report_api
        .milling_report(today, today, None)
        .expect("生成报表失败");

    assert_eq!(report.totals.runs, 2);
    assert_eq!(report.totals.units, 210);
    assert_eq!(report.totals.coarse, 130);
    assert_eq!(report.totals.fine, 80);

    // 客户按袋数降序
    assert_eq!(report.by_client[0].client_id, a);
    assert_eq!(report.by_client[1].client_id, b);
    assert_eq!(report.by_category.len(), 2);
    assert_eq!(report.by_day.len(), 1);

    let m3 = report
        .by_mill
        .iter()
        .find(|m| m.mill_id == "M3")
        .expect("应包含 M3");
    assert_eq!(m3.sacks, 60);
    assert_eq!(m3.busy_minutes, 120);
    assert_eq!(report.skipped_breakdowns, 0);

    let only_b = env
        .state
        .report_api
        .milling_report(today, today, Some(&b))
        .unwrap();
    assert_eq!(only_b.totals.runs, 1);
    assert_eq!(only_b.totals.units, 60);
}

#[test]
fn test_milling_report_日期范围无效() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let today = Local::now().date_naive();
    let yesterday = today.pred_opt().unwrap();

    let err = env
        .state
        .report_api
        .milling_report(today, yesterday, None)
        .unwrap_err();
    assert_api_code(&err, "INVALID_INPUT");
}

#[test]
fn test_export_milling_logs_csv() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_two_runs(&env);
    let today = Local::now().date_naive();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("milling.csv");
    let rows = env
        .state
        .report_api
        .export_milling_logs_csv(today, today, &path)
        .expect("导出失败");
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "log_id");
    assert!(headers.iter().any(|h| h == "total_units"));
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn test_plant_snapshot() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    seed_two_runs(&env);
    env.state
        .maintenance_api
        .start_maintenance("M4", MaintenanceKind::Preventive, "revision", "Ana")
        .unwrap();

    let snapshot = env.state.report_api.plant_snapshot().unwrap();
    assert_eq!(snapshot.mills_busy, 3);
    assert_eq!(snapshot.mills_free, 0);
    assert_eq!(snapshot.mills_maintenance, 1);
    assert_eq!(snapshot.open_maintenance, 1);
    assert_eq!(snapshot.total_coarse_stock, 300 - 130);
    assert_eq!(snapshot.total_fine_stock, 200 - 80);
}
