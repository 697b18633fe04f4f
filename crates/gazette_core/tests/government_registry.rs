use chrono::{NaiveDate, TimeZone, Utc};
use gazette_core::db::open_db_in_memory;
use gazette_core::model::slug::is_url_safe;
use gazette_core::{
    Edition, Government, GovernmentRepository, GovernmentService, NewGovernment, NewsArticle,
    RepoError, SqliteGovernmentRepository, ValidationReason,
};
use rusqlite::{params, Connection};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn service(conn: &Connection) -> GovernmentService<SqliteGovernmentRepository<'_>> {
    GovernmentService::new(SqliteGovernmentRepository::try_new(conn).unwrap())
}

fn expect_validation(err: RepoError, field: &str, reason: ValidationReason) {
    match err {
        RepoError::Validation(errors) => assert!(
            errors.contains(field, reason),
            "expected {field} {reason:?}, got {errors}"
        ),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn automatically_adds_a_slug_on_creation() {
    let conn = open_db_in_memory().unwrap();
    let government = service(&conn)
        .create(NewGovernment::new(
            "2005 to 2010 Labour government",
            date("2005-05-06"),
        ))
        .unwrap();

    assert_eq!(government.slug, "2005-to-2010-labour-government");
    assert!(is_url_safe(&government.slug));
}

#[test]
fn renaming_does_not_change_the_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let government = service
        .create(NewGovernment::new(
            "2004 to 2009 Labour government",
            date("2004-05-06"),
        ))
        .unwrap();

    let renamed = service
        .rename(government.id, "2005 to 2010 Labour government")
        .unwrap();
    assert_eq!(renamed.name, "2005 to 2010 Labour government");
    assert_eq!(renamed.slug, "2004-to-2009-labour-government");

    let reloaded = service.get(government.id).unwrap().unwrap();
    assert_eq!(reloaded.slug, "2004-to-2009-labour-government");
}

#[test]
fn rejects_blank_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for name in ["", "   "] {
        let err = service
            .create(NewGovernment::new(name, date("2005-05-06")))
            .unwrap_err();
        expect_validation(err, "name", ValidationReason::Blank);
    }
}

#[test]
fn rejects_blank_start_date() {
    let conn = open_db_in_memory().unwrap();
    let request = NewGovernment {
        name: "2005 to 2010 Labour government".to_string(),
        ..NewGovernment::default()
    };

    let err = service(&conn).create(request).unwrap_err();
    expect_validation(err, "start_date", ValidationReason::Blank);
}

#[test]
fn enforces_unique_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(
            NewGovernment::new("2005 to 2010 Labour government", date("2005-05-06"))
                .ending(date("2010-05-11")),
        )
        .unwrap();

    let err = service
        .create(NewGovernment::new(
            "2005 to 2010 Labour government",
            date("2010-05-12"),
        ))
        .unwrap_err();
    expect_validation(err, "name", ValidationReason::Taken);
}

#[test]
fn derived_slug_collision_gets_a_suffix() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let original = service
        .create(
            NewGovernment::new("2004 to 2009 Labour government", date("2004-01-01"))
                .ending(date("2004-12-31")),
        )
        .unwrap();
    service
        .rename(original.id, "2005 to 2010 Labour government")
        .unwrap();

    let reused_name = service
        .create(
            NewGovernment::new("2004 to 2009 Labour government", date("2005-01-01"))
                .ending(date("2005-12-31")),
        )
        .unwrap();

    assert_eq!(reused_name.slug, "2004-to-2009-labour-government-2");
    assert_ne!(reused_name.slug, original.slug);
}

#[test]
fn explicit_duplicate_slug_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(
            NewGovernment::new("First", date("2001-01-01"))
                .ending(date("2001-12-31"))
                .with_slug("first"),
        )
        .unwrap();

    let err = service
        .create(
            NewGovernment::new("Second", date("2002-01-01"))
                .ending(date("2002-12-31"))
                .with_slug("first"),
        )
        .unwrap_err();
    expect_validation(err, "slug", ValidationReason::Taken);

    let err = service
        .create(NewGovernment::new("Third", date("2003-01-01")).with_slug("Not A Slug"))
        .unwrap_err();
    expect_validation(err, "slug", ValidationReason::Invalid);
}

#[test]
fn storage_rejects_duplicate_names_written_behind_the_service() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();

    let err = conn
        .execute(
            "INSERT INTO governments (uuid, name, slug, start_date)
             VALUES (?1, 'Coalition', 'coalition-copy', '1990-01-01');",
            params![uuid::Uuid::new_v4().to_string()],
        )
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));
}

#[test]
fn knows_the_correct_current_government() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let current = service
        .create(NewGovernment::new(
            "2010 to 2015 Conservative and Liberal democrat coalition government",
            date("2010-05-12"),
        ))
        .unwrap();
    service
        .create(
            NewGovernment::new("2005 to 2010 Labour government", date("2005-05-06"))
                .ending(date("2010-05-11")),
        )
        .unwrap();

    assert_eq!(service.current().unwrap(), Some(current));
}

#[test]
fn current_is_none_without_an_ongoing_government() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(
            NewGovernment::new("2005 to 2010 Labour government", date("2005-05-06"))
                .ending(date("2010-05-11")),
        )
        .unwrap();

    assert_eq!(service.current().unwrap(), None);
}

#[test]
fn knows_the_active_government_at_a_date() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let government_current = service
        .create(NewGovernment::new(
            "2010 to 2015 Conservative and Liberal democrat coalition government",
            date("2010-05-12"),
        ))
        .unwrap();
    let government_in_2005 = service
        .create(
            NewGovernment::new("2005 to 2010 Labour government", date("2005-05-06"))
                .ending(date("2010-05-11")),
        )
        .unwrap();
    service
        .create(
            NewGovernment::new("2001 to 2005 Labour government", date("2001-06-08"))
                .ending(date("2005-05-05")),
        )
        .unwrap();

    let on = |value: &str| service.on_date(date(value)).unwrap();
    assert_eq!(on("2006-01-01").as_ref(), Some(&government_in_2005), "non-current government");
    assert_eq!(on("2010-05-11").as_ref(), Some(&government_in_2005), "last day of government");
    assert_eq!(on("2010-05-12").as_ref(), Some(&government_current), "first day of government");
    assert_eq!(on("1900-05-12"), None, "non existent past government");
    assert_eq!(on("2020-05-12").as_ref(), Some(&government_current), "ongoing government");
}

#[test]
fn future_date_is_none_once_every_government_has_ended() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let coalition = service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();
    service.conclude(coalition.id, date("2015-05-07")).unwrap();

    assert_eq!(service.on_date(date("2020-05-12")).unwrap(), None);
    assert_eq!(
        service.on_date(date("2015-05-07")).unwrap().map(|gov| gov.id),
        Some(coalition.id)
    );
}

#[test]
fn rejects_overlapping_ranges_and_second_ongoing_government() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();

    let err = service
        .create(NewGovernment::new("Majority", date("2015-05-08")))
        .unwrap_err();
    expect_validation(err, "start_date", ValidationReason::Overlaps);

    let err = service
        .create(
            NewGovernment::new("Labour", date("2005-05-06")).ending(date("2010-05-12")),
        )
        .unwrap_err();
    expect_validation(err, "start_date", ValidationReason::Overlaps);
}

#[test]
fn conclude_rejects_end_before_start() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let coalition = service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();

    let err = service
        .conclude(coalition.id, date("2010-05-11"))
        .unwrap_err();
    expect_validation(err, "end_date", ValidationReason::Invalid);
}

#[test]
fn current_reports_corrupt_state_with_two_ongoing_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP INDEX governments_single_current;")
        .unwrap();
    for (name, start) in [("one", "2001-01-01"), ("two", "2002-01-01")] {
        conn.execute(
            "INSERT INTO governments (uuid, name, slug, start_date) VALUES (?1, ?2, ?2, ?3);",
            params![uuid::Uuid::new_v4().to_string(), name, start],
        )
        .unwrap();
    }

    let repo = SqliteGovernmentRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.current_government(),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn political_documents_are_attributed_to_the_government_of_first_publication() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let labour = service
        .create(
            NewGovernment::new("2005 to 2010 Labour government", date("2005-05-06"))
                .ending(date("2010-05-11")),
        )
        .unwrap();
    service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();

    let mut edition = Edition::new("Budget statement", "budget-statement");
    edition.political = true;
    edition.publish(Utc.with_ymd_and_hms(2009, 3, 1, 12, 0, 0).unwrap());
    edition.publish(Utc.with_ymd_and_hms(2012, 3, 1, 12, 0, 0).unwrap());
    let article = NewsArticle::new(edition);

    let attributed = service.governing_at(&article).unwrap();
    assert_eq!(attributed.map(|gov| gov.id), Some(labour.id));

    let mut non_political = article.clone();
    non_political.edition.political = false;
    assert_eq!(service.governing_at(&non_political).unwrap(), None);
}

#[test]
fn non_ascii_names_get_transliterated_slugs() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let accented = service
        .create(
            NewGovernment::new("Élysée gouvernement", date("1990-01-01"))
                .ending(date("1990-12-31")),
        )
        .unwrap();
    assert_eq!(accented.slug, "elysee-gouvernement");

    let cyrillic = service
        .create(
            NewGovernment::new("Правительство", date("1991-01-01")).ending(date("1991-12-31")),
        )
        .unwrap();
    assert!(cyrillic.slug.starts_with("pravitel"));
    assert!(is_url_safe(&cyrillic.slug));
}

#[test]
fn names_without_sluggable_characters_fall_back_to_a_generic_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service
        .create(NewGovernment::new("!!!", date("1990-01-01")).ending(date("1990-12-31")))
        .unwrap();
    let second = service
        .create(NewGovernment::new("???", date("1991-01-01")).ending(date("1991-12-31")))
        .unwrap();

    assert_eq!(first.slug, "government");
    assert_eq!(second.slug, "government-2");
}

#[test]
fn far_dates_agree_with_range_coverage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let far_future = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
    let before_year_zero = NaiveDate::from_ymd_opt(-1, 6, 1).unwrap();

    let coalition = service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();
    assert!(coalition.covers(far_future));
    assert_eq!(service.on_date(far_future).unwrap(), Some(coalition.clone()));
    assert_eq!(service.on_date(before_year_zero).unwrap(), None);

    service.conclude(coalition.id, date("2015-05-07")).unwrap();
    assert_eq!(service.on_date(far_future).unwrap(), None);
}

#[test]
fn rejects_dates_outside_storable_years() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let far_future = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();

    let err = service
        .create(NewGovernment::new("Far future", far_future))
        .unwrap_err();
    expect_validation(err, "start_date", ValidationReason::Invalid);

    let coalition = service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();
    let err = service.conclude(coalition.id, far_future).unwrap_err();
    expect_validation(err, "end_date", ValidationReason::Invalid);
}

#[test]
fn storage_constraints_surface_as_field_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGovernmentRepository::try_new(&conn).unwrap();
    let government = |name: &str, slug: &str, start: &str, end: Option<&str>| Government {
        id: uuid::Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        start_date: date(start),
        end_date: end.map(date),
    };

    repo.insert_government(&government("Labour", "labour", "2005-05-06", Some("2010-05-11")))
        .unwrap();
    repo.insert_government(&government("Coalition", "coalition", "2010-05-12", None))
        .unwrap();

    let err = repo
        .insert_government(&government("Labour", "labour-again", "1997-05-02", Some("2001-06-07")))
        .unwrap_err();
    expect_validation(err, "name", ValidationReason::Taken);

    let err = repo
        .insert_government(&government("New Labour", "labour", "1997-05-02", Some("2001-06-07")))
        .unwrap_err();
    expect_validation(err, "slug", ValidationReason::Taken);

    let err = repo
        .insert_government(&government("Majority", "majority", "2015-05-08", None))
        .unwrap_err();
    expect_validation(err, "start_date", ValidationReason::Overlaps);
}

#[test]
fn conclude_rejects_a_government_that_already_ended() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let coalition = service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();
    service.conclude(coalition.id, date("2015-05-07")).unwrap();

    let err = service
        .conclude(coalition.id, date("2016-01-01"))
        .unwrap_err();
    expect_validation(err, "end_date", ValidationReason::Invalid);
    assert_eq!(
        service.get(coalition.id).unwrap().unwrap().end_date,
        Some(date("2015-05-07"))
    );
}

#[test]
fn rename_rejects_blank_and_taken_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let labour = service
        .create(
            NewGovernment::new("Labour", date("2005-05-06")).ending(date("2010-05-11")),
        )
        .unwrap();
    service
        .create(NewGovernment::new("Coalition", date("2010-05-12")))
        .unwrap();

    let err = service.rename(labour.id, "  ").unwrap_err();
    expect_validation(err, "name", ValidationReason::Blank);

    let err = service.rename(labour.id, "Coalition").unwrap_err();
    expect_validation(err, "name", ValidationReason::Taken);

    let unchanged = service.rename(labour.id, "Labour").unwrap();
    assert_eq!(unchanged.name, "Labour");
    assert_eq!(service.get(labour.id).unwrap().unwrap().name, "Labour");
}
