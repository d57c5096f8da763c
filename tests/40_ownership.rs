#[macro_use]
mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{error_type, Session};

#[tokio::test]
async fn records_of_another_account_look_missing() -> Result<()> {
    let server = server_or_skip!();
    let owner = Session::signup(server).await?;
    let intruder = Session::signup(server).await?;

    let (status, body) = owner
        .post("/income/post_income", json!({ "amount": 99, "income_date": "2024-04-04" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let id = body["results"]["income_id"].as_i64().unwrap_or_default();

    let (status, body) = intruder.get(&format!("/income/get_income/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "NotFoundError");

    let (status, body) = intruder
        .get(&format!("/income/get_incomes?income_ids=%5B{}%5D", id))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "NotFoundError");

    let (status, body) = intruder
        .put("/income/put_income", json!({ "income_id": id, "amount": 1 }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "NotFoundError");

    let (status, body) = intruder.delete(&format!("/income/delete_income/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "NotFoundError");

    // Untouched for the owner
    let (status, body) = owner.get(&format!("/income/get_income/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["amount"].as_f64(), Some(99.0));

    Ok(())
}

#[tokio::test]
async fn owner_comes_from_the_token_not_the_payload() -> Result<()> {
    let server = server_or_skip!();
    let owner = Session::signup(server).await?;
    let other = Session::signup(server).await?;

    let (status, body) = owner
        .post(
            "/expense/post_expense",
            json!({ "user_id": other.user_id(), "amount": 7, "expense_date": "2024-06-06" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["user_id"].as_i64(), Some(owner.user_id()));
    let id = body["results"]["expense_id"].as_i64().unwrap_or_default();

    // A user_id in an update is ignored as well
    let (status, body) = owner
        .put(
            "/expense/put_expense",
            json!({ "expense_id": id, "user_id": other.user_id(), "amount": 8 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["user_id"].as_i64(), Some(owner.user_id()));

    let (status, _) = other.get("/expense/get_all_expenses").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn get_all_lists_only_own_records() -> Result<()> {
    let server = server_or_skip!();
    let first = Session::signup(server).await?;
    let second = Session::signup(server).await?;

    for session in [&first, &second] {
        let (status, body) = session
            .post("/budget/post_budget", json!({ "amount": 300, "start_date": "2024-01-01", "end_date": "2024-02-01" }))
            .await?;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (status, body) = first.get("/budget/get_all_budgets").await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body["results"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"].as_i64(), Some(first.user_id()));

    Ok(())
}
