pub mod handlers;
pub mod models;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use stacks_kernel::{InitCtx, Migration, Module};

use handlers::SharedStore;

/// Book catalog module: CRUD resource over the configured store.
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        handlers::routes(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Add a book to the catalog",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed payload, failed validation, or rejected write",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "get": {
                        "summary": "List books (first 100, ordered by id)",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": {
                                "description": "Store failure",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer", "minimum": 0 }
                        }],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": { "description": "Malformed id" },
                            "404": { "description": "No live record with that id" }
                        }
                    },
                    "put": {
                        "summary": "Update a book's author and/or title",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Updated book" },
                            "400": { "description": "Malformed id or payload" },
                            "404": { "description": "No live record with that id" }
                        }
                    },
                    "delete": {
                        "summary": "Remove a book (logical delete)",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Deleted id, as {\"id\": n}" },
                            "400": { "description": "Malformed id" },
                            "404": { "description": "No live record with that id" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "author": { "type": "string" },
                            "title": { "type": "string" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "author", "title", "createdAt", "updatedAt"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "author": { "type": "string" },
                            "title": { "type": "string" }
                        },
                        "required": ["author", "title"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "author": { "type": "string" },
                            "title": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_create_books",
                up: "CREATE TABLE IF NOT EXISTS books ( \
                     id BIGSERIAL PRIMARY KEY, \
                     author VARCHAR(100) NOT NULL, \
                     title VARCHAR(100) NOT NULL, \
                     created_at TIMESTAMPTZ NOT NULL, \
                     updated_at TIMESTAMPTZ NOT NULL, \
                     deleted_at TIMESTAMPTZ \
                     )",
            },
            Migration {
                id: "002_deleted_at_index",
                up: "CREATE INDEX IF NOT EXISTS books_deleted_at_idx ON books (deleted_at)",
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module over the given store.
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
