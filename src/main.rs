//! 程序入口：解析命令行参数，加载 locale 目录并执行搜索或导出

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;

use fanyi_shu::model::locale;
use fanyi_shu::utils::fs::read_text_file;
use fanyi_shu::{load, ranked, save, Source, FILE_EXTENSION};

/// 聚合目录下的 <locale>.yml 翻译文档，支持打分搜索与精确回写
#[derive(Parser, Debug)]
#[command(name = "fanyi_shu", version, about)]
struct Cli {
    /// 存放 <locale>.yml 文档的目录
    dir: PathBuf,

    /// 在键名与译文中打分搜索，打印前 20 条结果
    #[arg(short, long)]
    search: Option<String>,

    /// 将合并后的树按 locale 序列化到该目录
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// 以 JSON 形式打印整棵树
    #[arg(long)]
    dump: bool,

    /// 打印调试级别日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志输出
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = SubscriberBuilder::default().with_max_level(level).try_init();

    let dir = resolve_locale_dir(&cli.dir);
    let sources = collect_sources(&dir)?;
    if sources.is_empty() {
        bail!("目录中没有可加载的 YAML 文档: {}", dir.display());
    }

    let outcome = load(sources).context("加载 locale 文档失败")?;
    let tree = &outcome.tree;

    println!(
        "已加载 {} 个 locale，共 {} 个翻译键",
        tree.locales().len(),
        tree.document_count()
    );
    for (identity, locale_code) in &outcome.locale_by_source {
        println!(
            "  {}.{} → {}",
            identity,
            FILE_EXTENSION,
            locale::display_name(locale_code)
        );
    }
    for warning in &outcome.warnings {
        println!("警告: {}", warning);
    }

    if let Some(query) = &cli.search {
        let hits = ranked(tree.roots(), query);
        if hits.is_empty() {
            println!("无匹配结果: {:?}", query);
        } else {
            for hit in hits {
                println!("{:.1}  {}", hit.score, hit.full_key);
            }
        }
    }

    if cli.dump {
        let text = serde_json::to_string_pretty(tree).context("序列化树失败")?;
        println!("{}", text);
    }

    if let Some(out_dir) = &cli.out {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("创建输出目录失败: {}", out_dir.display()))?;
        let report = save(tree, tree.locales(), out_dir);
        for (locale_code, path) in &report.written {
            println!("已写出 {} → {}", locale_code, path.display());
        }
        for (locale_code, err) in &report.failed {
            eprintln!("写出 {} 失败: {}", locale_code, err);
        }
        if !report.is_complete() {
            bail!("部分 locale 写出失败");
        }
    }

    Ok(())
}

/// 给定目录若含 config/locales 约定布局则自动下钻
fn resolve_locale_dir(dir: &Path) -> PathBuf {
    let nested = dir.join("config").join("locales");
    if nested.is_dir() {
        return nested;
    }
    dir.to_path_buf()
}

/// 收集目录下所有 <locale>.yml 文件作为待加载源，按文件名排序
fn collect_sources(dir: &Path) -> anyhow::Result<Vec<Source>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("读取目录失败: {}", dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("读取目录项失败: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = name.strip_suffix(".yml") else {
            continue;
        };
        // 形如 a.b.yml 的文件名不当作 locale 文档
        if stem.is_empty() || stem.contains('.') {
            continue;
        }
        let identity = stem.to_string();
        let text = read_text_file(&path)
            .with_context(|| format!("读取文件失败: {}", path.display()))?;
        tracing::debug!("已读取源文档: {}", path.display());
        sources.push(Source::with_origin(identity, text, path));
    }
    sources.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_sources_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("应能创建临时目录");
        std::fs::write(dir.path().join("en.yml"), "en: hello\n").expect("写入应成功");
        std::fs::write(dir.path().join("de.yml"), "de: hallo\n").expect("写入应成功");
        std::fs::write(dir.path().join("a.b.yml"), "a: x\n").expect("写入应成功");
        std::fs::write(dir.path().join("notes.txt"), "x\n").expect("写入应成功");
        std::fs::create_dir(dir.path().join("sub")).expect("建目录应成功");

        let sources = collect_sources(dir.path()).expect("收集应成功");

        let identities: Vec<&str> = sources.iter().map(|s| s.identity.as_str()).collect();
        assert_eq!(identities, vec!["de", "en"], "只收集单点 yml 且按名排序");
        assert_eq!(sources[0].text, "de: hallo\n", "内容应原样读入");
        let origin = sources[1].origin.as_ref().expect("来源路径应被记录");
        assert!(origin.ends_with("en.yml"), "来源路径应指向原文件");
    }

    #[test]
    fn test_resolve_locale_dir_descends_into_convention() {
        let dir = tempfile::tempdir().expect("应能创建临时目录");
        let nested = dir.path().join("config").join("locales");
        std::fs::create_dir_all(&nested).expect("建目录应成功");

        assert_eq!(resolve_locale_dir(dir.path()), nested, "应下钻到约定目录");

        let plain = tempfile::tempdir().expect("应能创建临时目录");
        assert_eq!(
            resolve_locale_dir(plain.path()),
            plain.path().to_path_buf(),
            "无约定布局时保持原目录"
        );
    }
}
