//! Create-or-update helpers, one per step type.
//!
//! Single-record steps look the session up first and PATCH the nested record
//! when one exists, otherwise POST a new one. A failed lookup is returned as
//! an error; it is never treated as "no record yet", which would create a
//! duplicate. List steps carry their own item ids, so they skip the lookup.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiResult, Collection, IntakeApi};
use crate::{
    domain::{AssetInfo, DebtInfo, DebtorInfo, ExpenseInfo, IncomeInfo, RecordId, SessionId},
    errors::ApiError,
    validation::{AssetDraft, DebtDraft, ListDraft, Persisted},
};

pub fn upsert_debtor<A: IntakeApi + ?Sized>(
    api: &A,
    session: SessionId,
    record: &DebtorInfo,
) -> ApiResult<DebtorInfo> {
    let existing = api.get_session(session)?.debtor_info.and_then(|r| r.id);
    upsert(api, Collection::DebtorInfo, session, existing, record)
}

pub fn upsert_income<A: IntakeApi + ?Sized>(
    api: &A,
    session: SessionId,
    record: &IncomeInfo,
) -> ApiResult<IncomeInfo> {
    let existing = api.get_session(session)?.income_info.and_then(|r| r.id);
    upsert(api, Collection::IncomeInfo, session, existing, record)
}

pub fn upsert_expense<A: IntakeApi + ?Sized>(
    api: &A,
    session: SessionId,
    record: &ExpenseInfo,
) -> ApiResult<ExpenseInfo> {
    let existing = api.get_session(session)?.expense_info.and_then(|r| r.id);
    upsert(api, Collection::ExpenseInfo, session, existing, record)
}

/// How far a list sync got before it failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncProgress {
    /// Removed ids the backend confirmed gone.
    pub deleted: Vec<RecordId>,
    /// Backend id of each leading list item stored before the failure.
    pub stored: Vec<Option<RecordId>>,
}

/// A list sync that stopped part way. The progress must be kept by the
/// caller, otherwise a retry would create the stored items a second time.
#[derive(Debug)]
pub struct SyncFailure {
    pub progress: SyncProgress,
    pub error: ApiError,
}

pub type SyncResult<T> = Result<Vec<T>, SyncFailure>;

/// Deletes removed assets, then creates or updates every listed one. Returns
/// the stored records in list order.
pub fn sync_assets<A: IntakeApi + ?Sized>(
    api: &A,
    session: SessionId,
    assets: &ListDraft<AssetDraft>,
) -> SyncResult<AssetInfo> {
    sync_list(
        api,
        Collection::Assets,
        session,
        assets,
        |draft| {
            draft
                .to_record()
                .ok_or_else(|| ApiError::Decode("asset has no type".into()))
        },
        |record: &AssetInfo| record.id,
    )
}

pub fn sync_debts<A: IntakeApi + ?Sized>(
    api: &A,
    session: SessionId,
    debts: &ListDraft<DebtDraft>,
) -> SyncResult<DebtInfo> {
    sync_list(
        api,
        Collection::Debts,
        session,
        debts,
        |draft| {
            draft
                .to_record()
                .ok_or_else(|| ApiError::Decode("debt has no type".into()))
        },
        |record: &DebtInfo| record.id,
    )
}

fn sync_list<A, D, T>(
    api: &A,
    collection: Collection,
    session: SessionId,
    list: &ListDraft<D>,
    to_record: impl Fn(&D) -> ApiResult<T>,
    id_of: impl Fn(&T) -> Option<RecordId>,
) -> SyncResult<T>
where
    A: IntakeApi + ?Sized,
    D: Persisted,
    T: Serialize + DeserializeOwned,
{
    let mut progress = SyncProgress::default();
    for &id in list.removed() {
        match api.delete_record(collection, id) {
            Ok(()) => {}
            // Already gone is the outcome we wanted.
            Err(err) if err.is_not_found() => {
                warn!(path = collection.path(), id, "record already deleted");
            }
            Err(error) => return Err(SyncFailure { progress, error }),
        }
        progress.deleted.push(id);
    }

    let mut records = Vec::with_capacity(list.len());
    for draft in list.items() {
        let outcome = to_record(draft)
            .and_then(|record| upsert(api, collection, session, draft.record_id(), &record));
        match outcome {
            Ok(record) => records.push(record),
            Err(error) => {
                progress.stored = records.iter().map(&id_of).collect();
                debug!(
                    path = collection.path(),
                    stored = progress.stored.len(),
                    "list sync stopped part way"
                );
                return Err(SyncFailure { progress, error });
            }
        }
    }
    Ok(records)
}

fn upsert<A, T>(
    api: &A,
    collection: Collection,
    session: SessionId,
    existing: Option<RecordId>,
    record: &T,
) -> ApiResult<T>
where
    A: IntakeApi + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let body = record_body(record)?;
    let stored = match existing {
        Some(id) => {
            debug!(path = collection.path(), id, "updating record");
            api.update_record(collection, id, &body)?
        }
        None => {
            debug!(path = collection.path(), session, "creating record");
            api.create_record(collection, session, &body)?
        }
    };
    serde_json::from_value(stored).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Serializes a record without its identity keys; the URL and the session
/// binding carry those.
fn record_body<T: Serialize>(record: &T) -> ApiResult<Value> {
    let mut body = serde_json::to_value(record).map_err(|err| ApiError::Decode(err.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
        map.remove("session");
        map.remove("equity");
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpIntakeClient;
    use crate::config::Config;
    use crate::domain::AssetType;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn draft(id: Option<RecordId>, description: &str, value: f64) -> AssetDraft {
        AssetDraft {
            record_id: id,
            asset_type: Some(AssetType::Vehicle),
            description: description.into(),
            current_value: value,
            ..AssetDraft::default()
        }
    }

    #[test]
    fn failed_list_sync_reports_what_was_stored() {
        let mut server = Server::new();
        let delete = server
            .mock("DELETE", "/api/intake/assets/9/")
            .with_status(204)
            .create();
        let first = server
            .mock("POST", "/api/intake/assets/")
            .match_body(Matcher::PartialJson(json!({ "description": "2016 Honda Civic" })))
            .with_status(201)
            .with_body(
                json!({
                    "id": 31,
                    "session": 5,
                    "asset_type": "vehicle",
                    "description": "2016 Honda Civic",
                    "current_value": "9000.00",
                    "amount_owed": "0.00",
                    "account_number": "",
                    "equity": "9000.00"
                })
                .to_string(),
            )
            .create();
        let second = server
            .mock("POST", "/api/intake/assets/")
            .match_body(Matcher::PartialJson(json!({ "description": "Old truck" })))
            .with_status(500)
            .with_body("Internal Server Error")
            .create();
        let client = HttpIntakeClient::new(&Config {
            api_base_url: format!("{}/api/", server.url()),
            ..Config::default()
        });
        let mut assets = ListDraft::from_items(vec![draft(Some(9), "Boat", 1200.0)]);
        assets.remove(0);
        assets.push(draft(None, "2016 Honda Civic", 9000.0));
        assets.push(draft(None, "Old truck", 1500.0));

        let failure = sync_assets(&client, 5, &assets).unwrap_err();

        delete.assert();
        first.assert();
        second.assert();
        assert_eq!(failure.progress.deleted, vec![9]);
        assert_eq!(failure.progress.stored, vec![Some(31)]);
        assert!(matches!(failure.error, ApiError::Status { status: 500, .. }));

        assets.acknowledge(&failure.progress.deleted, &failure.progress.stored);
        assert!(assets.removed().is_empty());
        let ids: Vec<_> = assets.items().iter().map(|a| a.record_id).collect();
        assert_eq!(ids, vec![Some(31), None]);
    }

    #[test]
    fn record_body_drops_identity_and_derived_keys() {
        let asset = AssetInfo {
            id: Some(4),
            session: Some(2),
            asset_type: crate::domain::AssetType::Vehicle,
            description: "2015 Honda Civic".into(),
            current_value: 8000.0,
            amount_owed: 0.0,
            account_number: String::new(),
            equity: 8000.0,
        };
        let body = record_body(&asset).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("session").is_none());
        assert!(body.get("equity").is_none());
        assert_eq!(body["description"], "2015 Honda Civic");
    }
}
