use medialib_core::{ApiVersion, MediaType, OperationObject, Value};
use medialib_db::*;

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    let rows = [
        (1, "one.mp3", "Audios/", ApiVersion::Legacy),
        (2, "two.mp3", "Audios/", ApiVersion::Legacy),
        (3, "one.mp3", "", ApiVersion::Unified),
        (4, "three.mp3", "Audios/Live/", ApiVersion::Legacy),
    ];
    for (n, name, path, api) in rows {
        insert_asset(
            &conn,
            OperationObject::Audio,
            &NewAsset {
                data: format!("/lib/Audio/0/{n}.mp3"),
                title: name.trim_end_matches(".mp3").to_string(),
                display_name: name.to_string(),
                media_type: MediaType::Audio,
                mime_type: "audio/mpeg".to_string(),
                owner_package: String::new(),
                date_added: n,
                time_pending: 0,
                relative_path: path.to_string(),
                virtual_path: if path.is_empty() {
                    String::new()
                } else {
                    format!("{path}{name}")
                },
                unique_number: n,
                api_type: api,
            },
        )
        .unwrap();
    }
    conn
}

#[test]
fn query_all_ordered_by_id() {
    let conn = setup_db();
    let all = query_assets(&conn, OperationObject::Audio, None, &[]).unwrap();
    let ids: Vec<i64> = all.iter().map(|a| a.file_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn query_with_bound_predicate() {
    let conn = setup_db();
    let hits = query_assets(
        &conn,
        OperationObject::Audio,
        Some("display_name = ?1"),
        &[Value::from("one.mp3")],
    )
    .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(
        query_assets(&conn, OperationObject::Photo, None, &[])
            .unwrap()
            .is_empty()
    );
}

#[test]
fn name_conflicts_only_among_live_legacy_rows() {
    let conn = setup_db();
    assert_eq!(
        find_legacy_name_conflict(&conn, OperationObject::Audio, "Audios/", "one.mp3", None)
            .unwrap(),
        Some(1)
    );
    // The row itself never conflicts
    assert_eq!(
        find_legacy_name_conflict(&conn, OperationObject::Audio, "Audios/", "one.mp3", Some(1))
            .unwrap(),
        None
    );
    // Unified rows are ignored
    assert_eq!(
        find_legacy_name_conflict(&conn, OperationObject::Audio, "", "one.mp3", None).unwrap(),
        None
    );

    set_date_trashed(&conn, OperationObject::Audio, 2, Some(5)).unwrap();
    assert_eq!(
        find_legacy_name_conflict(&conn, OperationObject::Audio, "Audios/", "two.mp3", None)
            .unwrap(),
        None
    );
}

#[test]
fn live_asset_count_by_prefix() {
    let conn = setup_db();
    assert_eq!(count_live_assets_under(&conn, "Audios/Live/").unwrap(), 1);
    assert_eq!(count_live_assets_under(&conn, "Audios/").unwrap(), 3);
    set_date_trashed(&conn, OperationObject::Audio, 4, Some(9)).unwrap();
    assert_eq!(count_live_assets_under(&conn, "Audios/Live/").unwrap(), 0);
}

#[test]
fn albums_listed_in_id_order() {
    let conn = setup_db();
    insert_album(&conn, "B", "Pictures/B/", 1).unwrap();
    insert_album(&conn, "A", "Pictures/A/", 2).unwrap();
    let names: Vec<String> = list_albums(&conn)
        .unwrap()
        .into_iter()
        .map(|a| a.album_name)
        .collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[test]
fn prefix_move_conflicts_with_live_legacy_names() {
    let conn = setup_db();
    assert_eq!(
        find_prefix_move_conflict(&conn, OperationObject::Audio, "Audios/Live/", "Audios/").unwrap(),
        None
    );

    let clash = insert_asset(
        &conn,
        OperationObject::Audio,
        &NewAsset {
            data: "/lib/Audio/0/5.mp3".to_string(),
            title: "one".to_string(),
            display_name: "one.mp3".to_string(),
            media_type: MediaType::Audio,
            mime_type: "audio/mpeg".to_string(),
            owner_package: String::new(),
            date_added: 5,
            time_pending: 0,
            relative_path: "Audios/Live/".to_string(),
            virtual_path: "Audios/Live/one.mp3".to_string(),
            unique_number: 5,
            api_type: ApiVersion::Legacy,
        },
    )
    .unwrap();
    assert_eq!(
        find_prefix_move_conflict(&conn, OperationObject::Audio, "Audios/Live/", "Audios/").unwrap(),
        Some((clash, "Audios/".to_string()))
    );

    set_date_trashed(&conn, OperationObject::Audio, 1, Some(9)).unwrap();
    assert_eq!(
        find_prefix_move_conflict(&conn, OperationObject::Audio, "Audios/Live/", "Audios/").unwrap(),
        None
    );
}
