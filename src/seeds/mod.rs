pub mod menu_seed;
