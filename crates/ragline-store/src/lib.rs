//! Ragline Store — Supabase vector table over the PostgREST API.

pub mod supabase;

pub use supabase::{DocumentRow, SupabaseStore};
