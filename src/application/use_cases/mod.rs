/// ディレクトリ公開ユースケース
pub mod publish_directory;
