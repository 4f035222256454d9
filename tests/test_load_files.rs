use envstruct::{load_with_env, ConfigError, EnvConfig, Environment, LoadOptions};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[derive(EnvConfig, Debug, PartialEq)]
struct RedisConfig {
    #[field(env = "DB_REDIS_ADDRESS", required)]
    address: String,
    #[field(env = "DB_REDIS_PASSWORD", required)]
    password: String,
}

#[derive(EnvConfig, Debug, PartialEq)]
struct RedisBlock {
    #[field(env = "ADDRESS", required)]
    address: String,
    #[field(env = "PASSWORD", required)]
    password: String,
}

#[derive(EnvConfig, Debug, PartialEq)]
struct PostgresBlock {
    #[field(env = "ADDRESS", required)]
    address: String,
    #[field(env = "PASSWORD", required)]
    password: String,
}

#[derive(EnvConfig, Debug, PartialEq)]
struct DbConfig {
    #[field(env = "DB_REDIS", nested)]
    redis: RedisBlock,
    #[field(env = "DB_POSTGRES", nested)]
    postgres: PostgresBlock,
}

fn expected_db() -> DbConfig {
    DbConfig {
        redis: RedisBlock {
            address: "redis.storage.address:6379".to_string(),
            password: "redisPass123Example".to_string(),
        },
        postgres: PostgresBlock {
            address: "psql.storage.address:6379".to_string(),
            password: "passPgSQL123Example".to_string(),
        },
    }
}

#[test]
fn test_load_one_file() {
    let options = LoadOptions::new()
        .add_files([fixture(".env.test")])
        .with_print_config();

    let config: RedisConfig = load_with_env(Environment::new(), &options).unwrap();

    assert_eq!(
        config,
        RedisConfig {
            address: "redis.storage.address:6379".to_string(),
            password: "redisPass123Example".to_string(),
        }
    );
}

#[test]
fn test_load_two_files_into_nested_blocks() {
    let options = LoadOptions::new()
        .add_files([fixture(".env.test"), fixture(".env.testTwo")])
        .with_print_config();

    let config: DbConfig = load_with_env(Environment::new(), &options).unwrap();

    assert_eq!(config, expected_db());
}

#[test]
fn test_load_two_files_with_prefix() {
    let options = LoadOptions::new()
        .add_file(fixture(".env.prefixRedis"))
        .add_file(fixture(".env.prefixPostgres"))
        .with_prefix("TEST_PREFIX")
        .with_print_config();

    let config: DbConfig = options.load_with_env(Environment::new()).unwrap();

    assert_eq!(config, expected_db());
}

#[test]
fn test_zero_files_with_satisfied_environment() {
    let env: Environment = [
        ("DB_REDIS_ADDRESS", "redis.storage.address:6379"),
        ("DB_REDIS_PASSWORD", "redisPass123Example"),
    ]
    .into_iter()
    .collect();

    let config: RedisConfig = load_with_env(env, &LoadOptions::new()).unwrap();

    assert_eq!(config.address, "redis.storage.address:6379");
    assert_eq!(config.password, "redisPass123Example");
}

#[test]
fn test_existing_environment_is_not_overwritten() {
    let env: Environment = [("DB_POSTGRES_ADDRESS", "already.set:5432")]
        .into_iter()
        .collect();
    let options = LoadOptions::new()
        .add_file(fixture(".env.test"))
        .add_file(fixture(".env.testTwo"));

    let config: DbConfig = load_with_env(env, &options).unwrap();

    assert_eq!(config.postgres.address, "already.set:5432");
    assert_eq!(config.postgres.password, "passPgSQL123Example");
}

#[test]
fn test_missing_required_field_fails() {
    let options = LoadOptions::new().add_file(fixture(".env.test"));

    let errors = load_with_env::<DbConfig>(Environment::new(), &options).unwrap_err();

    let keys: Vec<&str> = errors.iter().map(ConfigError::key).collect();
    assert_eq!(keys, vec!["DB_POSTGRES_ADDRESS", "DB_POSTGRES_PASSWORD"]);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::MissingEnvVar { .. })));
}

#[test]
fn test_missing_and_malformed_files_only_warn() {
    let env: Environment = [
        ("DB_REDIS_ADDRESS", "from-env:6379"),
        ("DB_REDIS_PASSWORD", "from-env"),
    ]
    .into_iter()
    .collect();
    let options = LoadOptions::new()
        .add_file(fixture(".env.does-not-exist"))
        .add_file(fixture(".env.malformed"));

    let config: RedisConfig = load_with_env(env, &options).unwrap();

    assert_eq!(config.address, "from-env:6379");
}

#[test]
fn test_nested_fields_fall_back_to_their_own_names() {
    let env: Environment = [
        ("ADDRESS", "shared.address:1"),
        ("PASSWORD", "shared-pass"),
        ("TEST_PREFIX_DB_POSTGRES_ADDRESS", "psql.storage.address:6379"),
    ]
    .into_iter()
    .collect();

    let config: DbConfig = LoadOptions::new()
        .with_prefix("TEST_PREFIX")
        .load_with_env(env)
        .unwrap();

    assert_eq!(config.redis.address, "shared.address:1");
    assert_eq!(config.redis.password, "shared-pass");
    assert_eq!(config.postgres.address, "psql.storage.address:6379");
    assert_eq!(config.postgres.password, "shared-pass");
}

#[test]
fn test_references_expand_from_given_environment() {
    let env: Environment = [("CACHE_HOST", "cache.internal"), ("CACHE_PASSWORD", "envPass")]
        .into_iter()
        .collect();
    let options = LoadOptions::new().add_file(fixture(".env.references"));

    let config: RedisConfig = load_with_env(env, &options).unwrap();

    assert_eq!(config.address, "cache.internal:6379");
    assert_eq!(config.password, "envPass");
}

#[test]
fn test_references_expand_from_earlier_files() {
    let options = LoadOptions::new()
        .add_file(fixture(".env.hosts"))
        .add_file(fixture(".env.references"));

    let config: RedisConfig = load_with_env(Environment::new(), &options).unwrap();

    assert_eq!(config.address, "cache.internal:6379");
    assert_eq!(config.password, "hostsPass");
}
