// ==========================================
// 登记类 API 集成测试
// ==========================================
// 测试范围:
// 1. 客户: 档案 CRUD、入库、盘点、分页筛选
// 2. 磨机: 登记、状态筛选、释放、删除约束
// 3. 维修: 开始/结束与磨机状态联动
// 4. 用户: 用户名唯一、启停用
// ==========================================

mod helpers;
mod test_helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::{bucket, coarse, ClientInputBuilder};

use mill_ops::domain::types::{
    DurationBucket, MaintenanceKind, MillStatus, MineralCategory, PageRequest, UserRole,
};
use mill_ops::repository::{ClientFilter, MaintenanceFilter};

// ==========================================
// 客户
// ==========================================

#[test]
fn test_client_创建与修改() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = &env.state.client_api;

    let client = api
        .create_client(
            &ClientInputBuilder::new("  Minera Santa Rosa ")
                .document_id("20481234567")
                .phone("  ")
                .build(),
        )
        .unwrap();
    assert_eq!(client.name, "Minera Santa Rosa");
    assert_eq!(client.phone, None);
    assert_eq!(client.coarse_stock, 0);

    let updated = api
        .update_client(
            &client.client_id,
            &ClientInputBuilder::new("Santa Rosa SAC")
                .category(MineralCategory::B)
                .phone("999111222")
                .build(),
        )
        .unwrap();
    assert_eq!(updated.mineral_category, MineralCategory::B);
    assert_eq!(updated.document_id, None);
    assert_eq!(api.get_client(&client.client_id).unwrap().name, "Santa Rosa SAC");

    let err = api
        .create_client(&ClientInputBuilder::new(" ").build())
        .unwrap_err();
    assert_api_code(&err, "INVALID_INPUT");
}

#[test]
fn test_client_入库与盘点() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let client = env.seed_client("Minera", MineralCategory::A, 100, 40);
    let api = &env.state.client_api;

    let client = api.receive_stock(&client.client_id, 20, 0).unwrap();
    assert_eq!((client.coarse_stock, client.fine_stock), (120, 40));

    assert_api_code(&api.receive_stock(&client.client_id, 0, 0).unwrap_err(), "INVALID_INPUT");
    assert_api_code(&api.receive_stock(&client.client_id, -5, 10).unwrap_err(), "INVALID_INPUT");
    assert_api_code(&api.receive_stock("ghost", 5, 0).unwrap_err(), "NOT_FOUND");

    let client = api.adjust_stock(&client.client_id, 0, 15).unwrap();
    assert_eq!((client.coarse_stock, client.fine_stock), (0, 15));
    assert_api_code(&api.adjust_stock(&client.client_id, -1, 0).unwrap_err(), "INVALID_INPUT");
}

#[test]
fn test_client_分页与筛选() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_client("Beta", MineralCategory::A, 0, 0);
    env.seed_client("Alfa", MineralCategory::B, 0, 0);
    env.seed_client("Gamma 50%", MineralCategory::A, 0, 0);
    let api = &env.state.client_api;

    let page = api
        .list_clients(&ClientFilter::default(), PageRequest::new(1, 2))
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alfa", "Beta"]);

    let filter = ClientFilter {
        mineral_category: Some(MineralCategory::A),
        ..Default::default()
    };
    assert_eq!(api.count_clients(&filter).unwrap(), 2);

    // LIKE 通配符按字面匹配
    let filter = ClientFilter {
        name_contains: Some("50%".to_string()),
        ..Default::default()
    };
    let page = api.list_clients(&filter, PageRequest::default()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Gamma 50%");
}

#[test]
fn test_client_有登记时不可删除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_mills(1, 150);
    let used = env.seed_client("Usado", MineralCategory::A, 50, 0);
    let unused = env.seed_client("Libre", MineralCategory::A, 0, 0);

    let api = &env.state.allocation_api;
    let sid = api.open_session(Some(hm(9, 0))).unwrap().session.session_id;
    api.select_client(&sid, &used.client_id).unwrap();
    api.apply_command(&sid, bucket(DurationBucket::A60)).unwrap();
    api.apply_command(&sid, coarse("M1", 20)).unwrap();
    api.submit(&sid, "operador").unwrap();

    let err = env.state.client_api.delete_client(&used.client_id).unwrap_err();
    assert_api_code(&err, "BUSINESS_RULE_VIOLATION");

    env.state.client_api.delete_client(&unused.client_id).unwrap();
    assert_api_code(
        &env.state.client_api.get_client(&unused.client_id).unwrap_err(),
        "NOT_FOUND",
    );
}

// ==========================================
// 磨机
// ==========================================

#[test]
fn test_mill_登记与状态筛选() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_mills(3, 150);
    let api = &env.state.mill_api;

    assert_api_code(&api.create_mill("M1", "Otro", 100).unwrap_err(), "BUSINESS_RULE_VIOLATION");
    assert_api_code(&api.create_mill("M9", "Cero", 0).unwrap_err(), "INVALID_INPUT");

    let updated = api.update_mill("M2", "Molino Grande", 200).unwrap();
    assert_eq!(updated.capacity_sacks, 200);

    env.state
        .maintenance_api
        .start_maintenance("M3", MaintenanceKind::Preventive, "cambio de bolas", "Ana")
        .unwrap();

    assert_eq!(api.count_mills(Some(MillStatus::Free)).unwrap(), 2);
    let page = api
        .list_mills(Some(MillStatus::Maintenance), PageRequest::default())
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].mill_id, "M3");

    let available: Vec<_> = api
        .list_available()
        .unwrap()
        .into_iter()
        .map(|m| m.mill_id)
        .collect();
    assert_eq!(available, vec!["M1".to_string(), "M2".to_string()]);
}

#[test]
fn test_mill_释放与删除约束() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_mills(2, 150);
    let client = env.seed_client("Minera", MineralCategory::A, 50, 0);

    // 空闲磨机不能释放
    let err = env.state.mill_api.release_mill("M1").unwrap_err();
    assert_api_code(&err, "INVALID_STATE_TRANSITION");

    let api = &env.state.allocation_api;
    let sid = api.open_session(Some(hm(9, 0))).unwrap().session.session_id;
    api.select_client(&sid, &client.client_id).unwrap();
    api.apply_command(&sid, bucket(DurationBucket::A100)).unwrap();
    api.apply_command(&sid, coarse("M1", 50)).unwrap();
    api.submit(&sid, "operador").unwrap();

    let busy = env.state.mill_api.get_mill("M1").unwrap();
    assert_eq!(busy.status, MillStatus::Busy);
    assert_eq!(busy.occupant_client_id.as_deref(), Some(client.client_id.as_str()));

    // 运行中的磨机不能删除
    let err = env.state.mill_api.delete_mill("M1").unwrap_err();
    assert_api_code(&err, "BUSINESS_RULE_VIOLATION");

    let released = env.state.mill_api.release_mill("M1").unwrap();
    assert_eq!(released.status, MillStatus::Free);
    assert!(released.occupant_client_id.is_none());

    env.state.mill_api.delete_mill("M2").unwrap();
    assert_eq!(env.state.mill_api.count_mills(None).unwrap(), 1);
}

// ==========================================
// 维修
// ==========================================

#[test]
fn test_maintenance_开始与结束() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_mills(2, 150);
    let api = &env.state.maintenance_api;

    assert_api_code(
        &api
            .start_maintenance("M1", MaintenanceKind::Corrective, " ", "Luis")
            .unwrap_err(),
        "INVALID_INPUT",
    );

    let record = api
        .start_maintenance("M1", MaintenanceKind::Corrective, "motor", "Luis")
        .unwrap();
    assert!(record.is_open());
    assert_eq!(env.mill_status("M1"), MillStatus::Maintenance);

    // 维修中不能重复开始
    let err = api
        .start_maintenance("M1", MaintenanceKind::Preventive, "otra", "Ana")
        .unwrap_err();
    assert_api_code(&err, "BUSINESS_RULE_VIOLATION");

    let open = api
        .list_maintenance(
            &MaintenanceFilter {
                open_only: true,
                ..Default::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(open.total, 1);

    let finished = api
        .finish_maintenance(&record.maintenance_id, Some("rodamiento cambiado"))
        .unwrap();
    assert!(!finished.is_open());
    assert_eq!(finished.notes.as_deref(), Some("rodamiento cambiado"));
    assert_eq!(env.mill_status("M1"), MillStatus::Free);

    let err = api.finish_maintenance(&record.maintenance_id, None).unwrap_err();
    assert_api_code(&err, "INVALID_STATE_TRANSITION");
    assert_api_code(&api.get_maintenance("ghost").unwrap_err(), "NOT_FOUND");
}

// ==========================================
// 用户
// ==========================================

#[test]
fn test_user_用户名唯一与启停用() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = &env.state.user_api;

    let user = api.create_user("operador", "Operador de turno", UserRole::Operator).unwrap();
    assert!(user.active);

    let err = api.create_user(" operador ", "Otro", UserRole::Viewer).unwrap_err();
    assert_api_code(&err, "BUSINESS_RULE_VIOLATION");

    let user = api.set_user_active(&user.user_id, false).unwrap();
    assert!(!user.active);

    let user = api.update_user(&user.user_id, "Jefe de turno", UserRole::Admin).unwrap();
    assert_eq!(user.role, UserRole::Admin);

    api.create_user("admin", "Administrador", UserRole::Admin).unwrap();
    let page = api.list_users(PageRequest::default()).unwrap();
    let names: Vec<_> = page.items.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["admin", "operador"]);
}
