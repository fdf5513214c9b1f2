use catalogo::domain::types::{CategoryId, ProductId};
use catalogo::forms::categories::AddCategoryForm;
use catalogo::forms::products::ProductForm;
use catalogo::pagination::{PAGINATION_HEADER, PagingParams};
use catalogo::services::ServiceError;
use catalogo::services::categories::{create_category, delete_category, list_categories};
use catalogo::services::products::{get_product, update_product};

mod common;

#[test]
fn created_category_appears_on_last_page() {
    let test_db = common::TestDb::new();

    let created = create_category(
        &test_db.unit_of_work(),
        AddCategoryForm {
            name: "Massas".to_string(),
            image_url: "massas.jpg".to_string(),
        },
    )
    .expect("create should succeed");
    assert_eq!(created.category_id, 4);

    let page = list_categories(
        &test_db.unit_of_work(),
        PagingParams {
            page_number: Some(2),
            page_size: Some(3),
        },
    )
    .expect("list should succeed");

    assert_eq!(page.items(), &[created]);
    let header = page.metadata().header_value().expect("metadata serializes");
    assert_eq!(PAGINATION_HEADER, "X-Pagination");
    assert!(header.contains("\"TotalCount\":4"));
    assert!(header.contains("\"HasPrevious\":true"));
}

#[test]
fn largest_page_number_lists_no_categories() {
    let test_db = common::TestDb::new();

    let page = list_categories(
        &test_db.unit_of_work(),
        PagingParams {
            page_number: Some(i64::MAX),
            page_size: Some(2),
        },
    )
    .expect("list should succeed");

    assert!(page.is_empty());
    assert_eq!(page.metadata().current_page, i64::MAX as usize);
    assert_eq!(page.metadata().total_pages, 2);
}

#[test]
fn product_update_round_trips_through_sqlite() {
    let test_db = common::TestDb::new();
    let id = ProductId::new(3).unwrap();
    let before = get_product(&test_db.unit_of_work(), id).expect("seeded product");

    let form = ProductForm {
        product_id: Some(3),
        name: "Pudim 200 g".to_string(),
        description: before.description.clone(),
        price: 12.9,
        image_url: before.image_url.clone(),
        stock: 7.0,
        category_id: 3,
    };
    update_product(&test_db.unit_of_work(), id, form).expect("update should succeed");

    let after = get_product(&test_db.unit_of_work(), id).expect("product still exists");
    assert_eq!(after.name, "Pudim 200 g");
    assert_eq!(after.price, 12.9);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn deleting_twice_reports_not_found() {
    let test_db = common::TestDb::new();
    let id = CategoryId::new(2).unwrap();

    delete_category(&test_db.unit_of_work(), id).expect("first delete succeeds");
    let err = delete_category(&test_db.unit_of_work(), id).expect_err("already gone");

    assert_eq!(err, ServiceError::NotFound);
}
