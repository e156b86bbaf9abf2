// src/specs/sites.rs
//
// Registry of the procurement listings we crawl. One entry per site; order
// here is the order of the run log and of the final report.

use crate::core::html::{AncestorPath, AttributeRule};

use super::{Extractor, SiteSpec};

const TD_TR_TABLE: &[&str] = &["td", "tr", "table"];
const TD_TR_TABLE_TD: &[&str] = &["td", "tr", "table", "td"];
const NESTED_TABLE: &[&str] = &["td", "tr", "table", "td", "tr", "table"];
const NESTED_FORM: &[&str] = &["td", "tr", "table", "td", "tr", "table", "form"];

const ANCHOR_ROW: Extractor = Extractor::AnchorRow { date_required: false };
const ONCLICK_POPUP: Extractor = Extractor::OnclickPopup { category_cell: 3, date_cell: 4, date_required: false };

fn rule(tag: &str, name: &str, value: &str) -> AttributeRule {
    AttributeRule::new(tag).require(name, value)
}

fn under(path: &[&str], tag: &str, name: &str, value: &str) -> AncestorPath {
    AncestorPath::new(path, rule(tag, name, value))
}

/// `tr[height=22]` rows inside a `table[width=99%]`.
fn height_22_rows(site: SiteSpec) -> SiteSpec {
    site.constrain(under(&["td", "tr"], "tr", "height", "22"))
        .constrain(under(TD_TR_TABLE, "table", "width", "99%"))
}

/// The three-level `DataGrid1 / tdcontent / moreinfo` nesting shared by
/// several listing engines, with an optional id prefix.
fn more_info_grid(site: SiteSpec, prefix: &str) -> SiteSpec {
    site.constrain(under(TD_TR_TABLE, "table", "id", &join!(prefix, "DataGrid1")))
        .constrain(under(TD_TR_TABLE_TD, "td", "id", &join!(prefix, "tdcontent")))
        .constrain(under(NESTED_TABLE, "table", "id", &join!(prefix, "moreinfo")))
}

fn ctl00_form(site: SiteSpec) -> SiteSpec {
    site.constrain(under(NESTED_FORM, "form", "id", "ctl00"))
}

pub fn all() -> Vec<SiteSpec> {
    vec![
        SiteSpec::new("http://www.yxztb.net/yxweb/zypd/012001/012001001/", "宜兴市", "a", ANCHOR_ROW)
            .cached_at("./sample-data/yi-xin")
            .constrain(under(&["td"], "td", "class", "tdmoreinfosub"))
            .constrain(under(TD_TR_TABLE, "table", "class", "tbmoreinfosub")),
        more_info_grid(
            SiteSpec::new("http://www.wxzb.net/wxzb/ZtbInfo/MoreZBGG.aspx", "无锡市", "a", ANCHOR_ROW)
                .cached_at("./sample-data/wu-xi"),
            "",
        ),
        more_info_grid(
            SiteSpec::new(
                "http://www.ggzy.com.cn/jyweb/ShowInfo/Moreinfo.aspx?CategoryNum=003001001001",
                "江阴市",
                "a",
                ANCHOR_ROW,
            )
            .cached_at("./sample-data/jiang-yin"),
            "MoreInfoList1_",
        ),
        SiteSpec::new(
            "http://zhaotoubiao.sipac.gov.cn/yqztbweb/ShowInfo/MoreInfo_zbgg.aspx?categoryNum=001001",
            "苏州工业园区",
            "a",
            ANCHOR_ROW,
        )
        .cached_at("./sample-data/su-zhou")
        .constrain(under(TD_TR_TABLE, "table", "id", "DataGrid1")),
        height_22_rows(
            SiteSpec::new("http://www.haztb.gov.cn/hawz/jyxx/004001/004001001/", "淮安市", "a", ANCHOR_ROW)
                .cached_at("./sample-data/huai-an"),
        ),
        SiteSpec::new(
            "http://www.cxztb.gov.cn:8080/cxxztb/jyxx/003001/003001001/003001001001/MoreInfo.aspx?CategoryNum=003001001001",
            "长兴县",
            "a",
            ANCHOR_ROW,
        )
        .cached_at("./sample-data/chang-xin")
        .constrain(under(TD_TR_TABLE, "table", "id", "MoreInfoList1_DataGrid1")),
        SiteSpec::new("http://ztb.huzhou.gov.cn/col/col3604/index.html", "湖州市", "a", ANCHOR_ROW)
            .cached_at("./sample-data/hu-zhou")
            .constrain(under(&["td", "tr", "table", "div", "div"], "div", "id", "5824")),
        height_22_rows(
            SiteSpec::new("http://www.czzbb.net/czztb/jyxx/010001/010001001/", "常州市", "a", ANCHOR_ROW)
                .cached_at("./sample-data/chang-zhou"),
        ),
        SiteSpec::new("http://ggzy.njzwfw.gov.cn/njggzy/jsgc/001001/001001001/001001001002/", "南京市", "a", ANCHOR_ROW)
            .cached_at("./sample-data/nan-jing")
            .constrain(AncestorPath::new(
                &["td", "tr", "table", "div", "td", "tr", "table"],
                AttributeRule::new("table").require("width", "998").require("class", "bk"),
            )),
        SiteSpec::new("http://www.zjcin.com/zjgcjs/ztbinfo/morezbgg.aspx", "镇江市", "a", Extractor::RowText)
            .cached_at("./sample-data/zhen-jiang")
            .constrain(under(TD_TR_TABLE, "table", "id", "DataGrid1")),
        SiteSpec::new("http://www.txsp.gov.cn:8888/jsjy/Bulletin.aspx?Organ=%D6%D0%D0%C4", "嘉兴市桐乡市", "a", Extractor::RowText)
            .cached_at("./sample-data/tong-xiang")
            .constrain(AncestorPath::itself(rule("a", "class", "BulletinDate"))),
        SiteSpec::new("http://zbcg.mas.gov.cn/maszbw/jyxx/005001/005001001/", "马鞍山市", "a", ANCHOR_ROW)
            .cached_at("./sample-data/ma-an-shan")
            .constrain(under(&["td"], "td", "width", "602")),
        ctl00_form(
            SiteSpec::new(
                "http://www.whzbb.com.cn/whweb/jyzx/013004/013004001/013004001001/013004001001001/MoreInfo.aspx?CategoryNum=013004001001001",
                "芜湖市",
                "a",
                ANCHOR_ROW,
            )
            .cached_at("./sample-data/wu-hu"),
        ),
        ctl00_form(
            SiteSpec::new(
                "http://www.dycg.gov.cn/dyzgw/jyxx/001001/001001001/MoreInfo.aspx?CategoryNum=001001001",
                "丹阳市",
                "a",
                ANCHOR_ROW,
            )
            .cached_at("./sample-data/dan-yang"),
        ),
        ctl00_form(
            SiteSpec::new(
                "http://www.yzzb.gov.cn/yzztb/zypd/010001/010001001/MoreInfo.aspx?CategoryNum=010001001",
                "扬中市",
                "a",
                ANCHOR_ROW,
            )
            .cached_at("./sample-data/yang-zhong"),
        ),
        more_info_grid(
            SiteSpec::new(
                "http://www.yzcetc.com/yzcetc/YW_Info/ZaoBiaoReport/MoreReportList_YZ_New.aspx?CategoryNum=003",
                "扬州市",
                "a",
                ONCLICK_POPUP,
            )
            .cached_at("./sample-data/yang-zhou"),
            "MoreInfoList1_",
        ),
        more_info_grid(
            SiteSpec::new("http://www.tzcetc.com/tzweb/yw_info/zaobiaoreport/moreinfo.aspx", "泰州市", "a", ANCHOR_ROW)
                .cached_at("./sample-data/tai-zhou"),
            "MoreInfoListZBGG1_",
        ),
        SiteSpec::new(
            "http://www.jszb.com.cn/jszb/YW_info/ZhaoBiaoGG/MoreInfo_ZBGG.aspx?categoryNum=012",
            "江苏省建设工程招标投标办公室",
            "a",
            ONCLICK_POPUP,
        )
        .cached_at("./sample-data/jiang-su")
        .constrain(under(TD_TR_TABLE, "table", "id", "MoreInfoList1_DataGrid1"))
        .constrain(under(TD_TR_TABLE_TD, "td", "id", "MoreInfoList1_tdcontent")),
        SiteSpec::new(
            "http://www.ntszjs.com/ntszzb/ProjectList.aspx?id=000100010002",
            "南通市",
            "a",
            Extractor::LabelledCells { label_cells: vec![0, 1, 3, 4], deadline_cell: 5, date_required: false },
        )
        .cached_at("./sample-data/nan-tong")
        .constrain(under(&["td"], "td", "align", "left"))
        .constrain(under(TD_TR_TABLE, "table", "class", "xian1")),
    ]
}

/// Sites whose name or listing URL is in `only`; everything when `only` is empty.
pub fn select(sites: Vec<SiteSpec>, only: &[String]) -> Vec<SiteSpec> {
    if only.is_empty() {
        return sites;
    }
    sites
        .into_iter()
        .filter(|s| only.iter().any(|o| *o == s.name || *o == s.url))
        .collect()
}
