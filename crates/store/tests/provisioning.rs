// Copyright (c) scorebook 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! End-to-end provisioning: filesystem migration sets applied through
//! `init`, and the ledger surviving a process restart (re-open).

use std::fs;

use rusqlite::Connection;
use scorebook_core::{DirSource, ScriptSource, StoreConfig};
use scorebook_store::{init, open, Migrator};
use scorebook_testing::tempdir::temp_dir;

fn write_migrations(dir: &std::path::Path) -> std::io::Result<()> {
	fs::create_dir_all(dir)?;
	fs::write(
		dir.join("0001_players.sql"),
		"CREATE TABLE players (\n\
		\tid   TEXT PRIMARY KEY,\n\
		\tname TEXT NOT NULL\n\
		 );",
	)?;
	fs::write(dir.join("0001_players.down.sql"), "DROP TABLE players;")?;
	fs::write(
		dir.join("0002_box_scores.sql"),
		"CREATE TABLE box_scores (\n\
		\tgame_id   TEXT NOT NULL,\n\
		\tplayer_id TEXT NOT NULL REFERENCES players (id),\n\
		\tpoints    INTEGER NOT NULL,\n\
		\tPRIMARY KEY (game_id, player_id)\n\
		 );",
	)?;
	fs::write(dir.join("0002_box_scores.down.sql"), "DROP TABLE box_scores;")?;
	Ok(())
}

fn user_tables(conn: &Connection) -> Vec<String> {
	let mut stmt = conn
		.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
		.unwrap();
	stmt.query_map([], |row| row.get(0)).unwrap().collect::<rusqlite::Result<_>>().unwrap()
}

#[test]
fn init_applies_the_full_migration_set_once() {
	temp_dir(|path| {
		let migrations_dir = path.join("migrations");
		write_migrations(&migrations_dir)?;

		let db = path.join("warehouse.db");
		let config = StoreConfig::default();
		let migrations = DirSource::new(&migrations_dir);

		assert_eq!(init(&db, &config, &migrations).unwrap(), 2);

		// Re-open: the applied set persisted inside the store itself.
		let conn = open(&db, &config).unwrap();
		let migrator = Migrator::new(&migrations);
		assert_eq!(migrator.apply_pending(&conn).unwrap(), 0);
		assert_eq!(user_tables(&conn), vec!["box_scores", "players", "schema_migrations"]);
		Ok(())
	})
	.unwrap();
}

#[test]
fn missing_migrations_directory_succeeds_trivially() {
	temp_dir(|path| {
		let db = path.join("warehouse.db");
		let migrations = DirSource::new(path.join("no_such_dir"));
		assert_eq!(init(&db, &StoreConfig::default(), &migrations).unwrap(), 0);
		Ok(())
	})
	.unwrap();
}

#[test]
fn rollback_one_step_leaves_the_older_unit_applied() {
	temp_dir(|path| {
		let migrations_dir = path.join("migrations");
		write_migrations(&migrations_dir)?;

		let db = path.join("warehouse.db");
		let config = StoreConfig::default();
		let migrations = DirSource::new(&migrations_dir);
		init(&db, &config, &migrations).unwrap();

		let conn = open(&db, &config).unwrap();
		let migrator = Migrator::new(&migrations);
		assert_eq!(migrator.rollback(&conn, 1).unwrap(), 1);

		assert_eq!(user_tables(&conn), vec!["players", "schema_migrations"]);
		assert_eq!(migrator.pending(&conn).unwrap(), vec!["0002_box_scores"]);
		Ok(())
	})
	.unwrap();
}

#[test]
fn foreign_keys_are_enforced_on_provisioned_handles() {
	temp_dir(|path| {
		let migrations_dir = path.join("migrations");
		write_migrations(&migrations_dir)?;

		let db = path.join("warehouse.db");
		let config = StoreConfig::default();
		let migrations = DirSource::new(&migrations_dir);
		init(&db, &config, &migrations).unwrap();

		let conn = open(&db, &config).unwrap();
		let err = conn.execute(
			"INSERT INTO box_scores (game_id, player_id, points) VALUES ('g1', 'ghost', 10)",
			[],
		);
		assert!(err.is_err(), "orphan box score must violate the players FK");
		Ok(())
	})
	.unwrap();
}

#[test]
fn definitions_source_lists_pairs_in_filename_order() {
	temp_dir(|path| {
		let migrations_dir = path.join("migrations");
		write_migrations(&migrations_dir)?;

		let names: Vec<String> = DirSource::new(&migrations_dir)
			.scripts()
			.unwrap()
			.into_iter()
			.map(|s| s.name)
			.collect();
		assert_eq!(
			names,
			vec!["0001_players", "0001_players.down", "0002_box_scores", "0002_box_scores.down"]
		);
		Ok(())
	})
	.unwrap();
}
