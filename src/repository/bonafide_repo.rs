use crate::model::bonafide_request::{BonafideRequest, BonafideUpdate, Decision, RequestStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait BonafideRepository: Send + Sync {
    async fn create(&self, request: BonafideRequest) -> RepositoryResult<BonafideRequest>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<BonafideRequest>;
    async fn find_by_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<BonafideRequest>>;
    async fn find_by_status(&self, status: RequestStatus) -> RepositoryResult<Vec<BonafideRequest>>;
    async fn list_all(&self) -> RepositoryResult<Vec<BonafideRequest>>;
    /// Versioned update of the allow-listed fields. The write is conditional
    /// on `version` matching; a stale version yields Conflict.
    async fn update(
        &self,
        id: ObjectId,
        expected_version: i64,
        update: BonafideUpdate,
    ) -> RepositoryResult<BonafideRequest>;
    /// Apply an admin decision. The write is conditional on the record still
    /// being pending; an already-decided record yields Conflict.
    async fn decide(&self, id: ObjectId, decision: Decision) -> RepositoryResult<BonafideRequest>;
    async fn set_pdf_generated(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn count(&self, status: Option<RequestStatus>) -> RepositoryResult<u64>;
}

pub struct MongoBonafideRepository {
    collection: mongodb::Collection<BonafideRequest>,
}

impl MongoBonafideRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        MongoBonafideRepository {
            collection: db.collection::<BonafideRequest>(collection_name),
        }
    }

    async fn collect(
        &self,
        cursor: mongodb::Cursor<BonafideRequest>,
    ) -> RepositoryResult<Vec<BonafideRequest>> {
        let mut cursor = cursor;
        let mut requests = Vec::new();
        while let Some(request) = cursor.next().await {
            match request {
                Ok(r) => requests.push(r),
                Err(e) => {
                    error!("Failed to deserialize request: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize request: {}",
                        e
                    )));
                }
            }
        }
        Ok(requests)
    }

    /// Distinguish a failed conditional write: the id may be gone entirely,
    /// or present but no longer matching the condition.
    async fn classify_missed_write(
        &self,
        id: ObjectId,
        conflict_msg: &str,
    ) -> RepositoryError {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(_)) => RepositoryError::conflict(format!("{} (ID: {})", conflict_msg, id)),
            Ok(None) => {
                RepositoryError::not_found(format!("Request not found for ID: {}", id))
            }
            Err(e) => RepositoryError::database(format!("Failed to re-check request: {}", e)),
        }
    }
}

#[async_trait]
impl BonafideRepository for MongoBonafideRepository {
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn create(&self, request: BonafideRequest) -> RepositoryResult<BonafideRequest> {
        info!("Creating new bonafide request");
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        new_request.version = 1;
        let now = chrono::Utc::now().to_rfc3339();
        new_request.created_at = Some(now.clone());
        new_request.updated_at = Some(now);

        match self.collection.insert_one(new_request.clone(), None).await {
            Ok(_) => {
                info!("Bonafide request created successfully");
                Ok(new_request)
            }
            Err(e) => {
                error!("Failed to create bonafide request: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to create bonafide request: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<BonafideRequest> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(request)) => Ok(request),
            Ok(None) => Err(RepositoryError::not_found(format!(
                "Request not found for ID: {}",
                id
            ))),
            Err(e) => {
                error!("Failed to fetch request by ID: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to fetch request by ID: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn find_by_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<BonafideRequest>> {
        let filter = doc! { "userId": user_id };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list requests: {}", e)))?;
        self.collect(cursor).await
    }

    #[tracing::instrument(skip(self), fields(status = %status))]
    async fn find_by_status(
        &self,
        status: RequestStatus,
    ) -> RepositoryResult<Vec<BonafideRequest>> {
        let filter = doc! { "status": status.as_str() };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list requests: {}", e)))?;
        self.collect(cursor).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<BonafideRequest>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list requests: {}", e)))?;
        let requests = self.collect(cursor).await?;
        info!("Fetched {} requests", requests.len());
        Ok(requests)
    }

    #[tracing::instrument(skip(self, update), fields(id = %id, expected_version))]
    async fn update(
        &self,
        id: ObjectId,
        expected_version: i64,
        update: BonafideUpdate,
    ) -> RepositoryResult<BonafideRequest> {
        let mut set = Document::new();
        if let Some(student_name) = update.student_name {
            set.insert("studentName", student_name);
        }
        if let Some(roll_number) = update.roll_number {
            set.insert("rollNumber", roll_number);
        }
        if let Some(father_name) = update.father_name {
            set.insert("fatherName", father_name);
        }
        if let Some(department) = update.department {
            set.insert("department", department);
        }
        if let Some(course) = update.course {
            set.insert("course", course);
        }
        if let Some(academic_year) = update.academic_year {
            set.insert("academicYear", academic_year);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            set.insert("dateOfBirth", date_of_birth);
        }
        if let Some(purpose) = update.purpose {
            set.insert("purpose", purpose);
        }
        if let Some(conduct) = update.conduct {
            set.insert("conduct", conduct);
        }
        if let Some(admin_notes) = update.admin_notes {
            set.insert("adminNotes", admin_notes);
        }
        set.insert("updatedAt", chrono::Utc::now().to_rfc3339());

        let filter = doc! { "_id": id, "version": expected_version };
        let change = doc! { "$set": set, "$inc": { "version": 1 } };
        let result = self
            .collection
            .update_one(filter, change, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update request: {}", e)))?;
        if result.modified_count == 0 {
            return Err(self
                .classify_missed_write(id, "Request was modified concurrently")
                .await);
        }
        self.get_by_id(id).await
    }

    #[tracing::instrument(skip(self, decision), fields(id = %id, status = %decision.status))]
    async fn decide(&self, id: ObjectId, decision: Decision) -> RepositoryResult<BonafideRequest> {
        info!("Applying decision to bonafide request");
        let now = chrono::Utc::now().to_rfc3339();
        let filter = doc! { "_id": id, "status": RequestStatus::Pending.as_str() };
        let change = doc! {
            "$set": {
                "status": decision.status.as_str(),
                "approvedBy": decision.admin_id,
                "approvedAt": now.clone(),
                "adminNotes": decision.notes,
                "updatedAt": now,
            },
            "$inc": { "version": 1 },
        };
        let result = self
            .collection
            .update_one(filter, change, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to apply decision: {}", e)))?;
        if result.modified_count == 0 {
            return Err(self
                .classify_missed_write(id, "Request has already been decided")
                .await);
        }
        self.get_by_id(id).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn set_pdf_generated(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        let change = doc! { "$set": {
            "pdfGenerated": true,
            "updatedAt": chrono::Utc::now().to_rfc3339(),
        }};
        let result = self
            .collection
            .update_one(filter, change, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to mark pdf generated: {}", e))
            })?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "Request not found for ID: {}",
                id
            )));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        let result = self
            .collection
            .delete_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete request: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No request found to delete for ID: {}",
                id
            )));
        }
        info!("Request deleted successfully for ID: {}", id);
        Ok(())
    }

    async fn count(&self, status: Option<RequestStatus>) -> RepositoryResult<u64> {
        let filter = status.map(|s| doc! { "status": s.as_str() });
        self.collection
            .count_documents(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count requests: {}", e)))
    }
}
