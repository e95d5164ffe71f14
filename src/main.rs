use clap::Parser;

use hazmat_rust::tools::*;
use hazmat_rust::{NiceError, Opt, Tool};

fn main() {
    let opt = Opt::parse();
    opt.logger.enable_log();

    let config = opt.config.as_deref();
    match opt.tool {
        Tool::Build(opt) => main_build(opt, config),
        Tool::Run(opt) => main_run(opt, config),
        Tool::Test(opt) => main_test(opt, config),
        Tool::Live(opt) => main_live(opt, config),
        Tool::Generate(opt) => main_generate(opt, config),
        Tool::Merge(opt) => main_merge(opt, config),
        Tool::Init(opt) => main_init(opt, config),
        Tool::GenAutocompletion(opt) => main_gen_autocompletion(opt),
    }
    .nice_unwrap()
}
